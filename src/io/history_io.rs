use std::fs;
use std::path::{Path, PathBuf};

use crate::io::storage::{StorageError, atomic_write};
use crate::model::checklist::Checklist;
use crate::ops::undo::UndoManager;

/// Undo history kept next to a checklist file
pub type History = UndoManager<Checklist>;

/// `<checklist file>.history.json`
pub fn history_path(checklist_path: &Path) -> PathBuf {
    let mut name = checklist_path.as_os_str().to_owned();
    name.push(".history.json");
    PathBuf::from(name)
}

/// Read the sidecar. Missing or unreadable history starts empty.
pub fn read_history(checklist_path: &Path, max_history: usize) -> History {
    let path = history_path(checklist_path);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return History::new(max_history),
    };
    match serde_json::from_str::<History>(&content) {
        Ok(mut history) => {
            history.set_max_history(max_history);
            history
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed history");
            History::new(max_history)
        }
    }
}

pub fn write_history(checklist_path: &Path, history: &History) -> Result<(), StorageError> {
    let path = history_path(checklist_path);
    let content = serde_json::to_string(history)?;
    atomic_write(&path, content.as_bytes()).map_err(|e| StorageError::Write { path, source: e })
}

/// Delete the sidecar if present
pub fn remove_history(checklist_path: &Path) -> Result<(), StorageError> {
    let path = history_path(checklist_path);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::Write { path, source: e }),
    }
}
