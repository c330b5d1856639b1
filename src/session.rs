use crate::io::history_io::{self, History};
use crate::io::storage::{Storage, StorageError};
use crate::model::checklist::Checklist;
use crate::ops::checklist_ops::{self, ChecklistError};
use crate::ops::drag_drop::DragDropManager;

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Checklist(#[from] ChecklistError),
}

/// The live checklist together with its file and undo history.
///
/// Every mutation goes through [`Session::perform`]: snapshot, mutate,
/// record, save.
#[derive(Debug)]
pub struct Session {
    storage: Storage,
    checklist: Checklist,
    history: History,
    drag: DragDropManager,
}

impl Session {
    /// Open the checklist at the storage path.
    ///
    /// A missing file is created with the default categories. A file that
    /// cannot be read or parsed is reported and left untouched; the session
    /// starts from the default document in memory.
    pub fn open(storage: Storage, max_history: usize) -> Result<Self, SessionError> {
        let checklist = match storage.load() {
            Ok(checklist) => checklist,
            Err(StorageError::NotFound(_)) => {
                let checklist = Storage::default_checklist();
                storage.save(&checklist)?;
                checklist
            }
            Err(e) => {
                tracing::warn!(error = %e, "using default checklist");
                Storage::default_checklist()
            }
        };
        let history = history_io::read_history(storage.path(), max_history);
        Ok(Session {
            storage,
            checklist,
            history,
            drag: DragDropManager::new(),
        })
    }

    /// A session over an in-memory checklist; nothing is read from disk
    pub fn with_checklist(storage: Storage, checklist: Checklist, max_history: usize) -> Self {
        Session {
            storage,
            checklist,
            history: History::new(max_history),
            drag: DragDropManager::new(),
        }
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Apply a mutation as one undoable step. On error the checklist is
    /// restored and nothing is recorded or saved.
    pub fn perform<T>(
        &mut self,
        description: &str,
        action: impl FnOnce(&mut Checklist) -> Result<T, ChecklistError>,
    ) -> Result<T, SessionError> {
        let snapshot = self.checklist.clone();
        match action(&mut self.checklist) {
            Ok(value) => {
                self.history.record_state(&snapshot, description);
                self.save()?;
                Ok(value)
            }
            Err(e) => {
                self.checklist = snapshot;
                Err(e.into())
            }
        }
    }

    /// Revert the last action. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        match self.history.undo(&self.checklist) {
            Some(previous) => {
                self.checklist = previous;
                self.save()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reapply the last undone action. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, SessionError> {
        match self.history.redo(&self.checklist) {
            Some(next) => {
                self.checklist = next;
                self.save()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move a category by drag and drop. Returns false for an invalid move.
    pub fn drag_category(&mut self, from: usize, to: usize) -> Result<bool, SessionError> {
        if !self.drag.start_drag(&self.checklist, from) {
            return Ok(false);
        }
        let snapshot = self.checklist.clone();
        if !self.drag.end_drag(&mut self.checklist, to) {
            return Ok(false);
        }
        self.history.record_state(&snapshot, "Reorder categories");
        self.save()?;
        Ok(true)
    }

    /// Change the current category. Selection is not an undoable step.
    pub fn select_category(&mut self, id: i64) -> Result<(), SessionError> {
        checklist_ops::select_category(&mut self.checklist, id)?;
        self.storage.save(&self.checklist)?;
        Ok(())
    }

    /// Write the checklist and its history sidecar
    pub fn save(&self) -> Result<(), SessionError> {
        self.storage.save(&self.checklist)?;
        history_io::write_history(self.storage.path(), &self.history)?;
        Ok(())
    }

    /// Forget all undo/redo steps
    pub fn clear_history(&mut self) -> Result<(), SessionError> {
        self.history.clear();
        history_io::write_history(self.storage.path(), &self.history)?;
        Ok(())
    }
}
