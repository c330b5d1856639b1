pub mod checklist_ops;
pub mod drag_drop;
pub mod export;
pub mod reminders;
pub mod search;
pub mod sort;
pub mod undo;
