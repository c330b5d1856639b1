use crate::model::checklist::Checklist;

/// Called after a successful drop with `(from, to)`
pub type ReorderCallback = Box<dyn FnMut(usize, usize)>;

/// Drag state: either idle or holding the index being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { source: usize },
}

/// Tracks one category drag at a time and applies the move on drop.
///
/// Indices follow [`Checklist::reorder_categories`]: the dragged category is
/// removed first, then inserted at the target index of the shortened list.
#[derive(Default)]
pub struct DragDropManager {
    state: DragState,
    on_reorder: Option<ReorderCallback>,
}

impl std::fmt::Debug for DragDropManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragDropManager")
            .field("state", &self.state)
            .field("on_reorder", &self.on_reorder.is_some())
            .finish()
    }
}

impl DragDropManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(on_reorder: impl FnMut(usize, usize) + 'static) -> Self {
        DragDropManager {
            state: DragState::Idle,
            on_reorder: Some(Box::new(on_reorder)),
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Begin dragging the category at `index`. An out-of-range index leaves
    /// the state untouched and returns false; a new drag replaces any
    /// drag already in progress.
    pub fn start_drag(&mut self, checklist: &Checklist, index: usize) -> bool {
        if index >= checklist.category_count() {
            return false;
        }
        self.state = DragState::Dragging { source: index };
        true
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn source_index(&self) -> Option<usize> {
        match self.state {
            DragState::Dragging { source } => Some(source),
            DragState::Idle => None,
        }
    }

    /// True when both indices are in bounds and differ
    pub fn validate_reorder(&self, checklist: &Checklist, from: usize, to: usize) -> bool {
        let count = checklist.category_count();
        from < count && to < count && from != to
    }

    /// Category names in the order a drop would produce, without moving anything
    pub fn reorder_preview(
        &self,
        checklist: &Checklist,
        from: usize,
        to: usize,
    ) -> Option<Vec<String>> {
        if !self.validate_reorder(checklist, from, to) {
            return None;
        }
        let mut names: Vec<String> = checklist.categories.iter().map(|c| c.name.clone()).collect();
        let moved = names.remove(from);
        names.insert(to, moved);
        Some(names)
    }

    /// Drop onto `target`. Moves the category and notifies the callback when
    /// a drag is in progress and the move is valid. Always ends idle.
    pub fn end_drag(&mut self, checklist: &mut Checklist, target: usize) -> bool {
        let source = match std::mem::take(&mut self.state) {
            DragState::Dragging { source } => source,
            DragState::Idle => return false,
        };
        if !self.validate_reorder(checklist, source, target) {
            return false;
        }
        if !checklist.reorder_categories(source, target) {
            return false;
        }
        tracing::debug!(from = source, to = target, "category reordered");
        if let Some(callback) = self.on_reorder.as_mut() {
            callback(source, target);
        }
        true
    }

    /// Abandon any drag in progress without touching the checklist
    pub fn reset_drag(&mut self) {
        self.state = DragState::Idle;
    }
}
