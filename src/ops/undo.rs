use serde::{Deserialize, Serialize};

/// Default number of undo steps kept
pub const DEFAULT_MAX_HISTORY: usize = 20;

/// A whole-state snapshot and the action it precedes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub state: T,
    pub description: String,
}

/// Bounded undo/redo history of whole-state snapshots.
///
/// Callers record the state *before* each change. `undo` takes the live
/// state, stores it as the redo point and hands back the previous snapshot;
/// `redo` does the reverse. Every state handed out is an owned copy, so
/// mutating it never touches the stored history.
///
/// Both stacks together never hold more than `max_history` snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoManager<T> {
    undo: Vec<Snapshot<T>>,
    redo: Vec<Snapshot<T>>,
    max_history: usize,
}

impl<T: Clone> Default for UndoManager<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl<T: Clone> UndoManager<T> {
    /// Create an empty history. A zero capacity is treated as one.
    pub fn new(max_history: usize) -> Self {
        UndoManager {
            undo: Vec::new(),
            redo: Vec::new(),
            max_history: max_history.max(1),
        }
    }

    /// Record the state as it was before a change. Clears the redo stack and
    /// evicts the oldest snapshot once the limit is exceeded.
    pub fn record_state(&mut self, state: &T, description: impl Into<String>) {
        self.undo.push(Snapshot {
            state: state.clone(),
            description: description.into(),
        });
        if self.undo.len() > self.max_history {
            self.undo.drain(..self.undo.len() - self.max_history);
        }
        self.redo.clear();
        tracing::debug!(undo = self.undo.len(), "recorded undo snapshot");
    }

    /// Step back. `current` becomes the redo point. Returns `None` (and
    /// leaves the history untouched) when there is nothing to undo.
    pub fn undo(&mut self, current: &T) -> Option<T> {
        let previous = self.undo.pop()?;
        self.redo.push(Snapshot {
            state: current.clone(),
            description: previous.description.clone(),
        });
        Some(previous.state)
    }

    /// Step forward. `current` becomes the undo point again.
    pub fn redo(&mut self, current: &T) -> Option<T> {
        let next = self.redo.pop()?;
        self.undo.push(Snapshot {
            state: current.clone(),
            description: next.description.clone(),
        });
        Some(next.state)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Description of the action the next `undo` would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.undo.last().map(|s| s.description.as_str())
    }

    /// Description of the action the next `redo` would reapply
    pub fn redo_description(&self) -> Option<&str> {
        self.redo.last().map(|s| s.description.as_str())
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Change the limit, evicting the oldest snapshots if needed
    pub fn set_max_history(&mut self, max_history: usize) {
        self.max_history = max_history.max(1);
        if self.undo.len() > self.max_history {
            self.undo.drain(..self.undo.len() - self.max_history);
        }
        let room = self.max_history - self.undo.len();
        if self.redo.len() > room {
            // Redo entries are popped from the end; the oldest sit at the front
            self.redo.drain(..self.redo.len() - room);
        }
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
