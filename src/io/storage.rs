use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use tempfile::NamedTempFile;

use crate::model::checklist::Checklist;
use crate::ops::export::{ExportOptions, export_markdown};

/// Error type for checklist file I/O
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("checklist file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("could not parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize checklist: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// The checklist JSON file at a fixed path
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Storage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub fn file_exists(&self) -> bool {
        self.path.is_file()
    }

    /// The document a brand-new checklist file starts with
    pub fn default_checklist() -> Checklist {
        Checklist::with_default_categories()
    }

    /// Read and parse the whole document
    pub fn load(&self) -> Result<Checklist, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(self.path.clone()));
            }
            Err(e) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let checklist = serde_json::from_str(&content).map_err(|e| StorageError::Parse {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), "loaded checklist");
        Ok(checklist)
    }

    /// Load the document, or the default one if the file does not exist yet
    pub fn load_or_default(&self) -> Result<Checklist, StorageError> {
        match self.load() {
            Err(StorageError::NotFound(_)) => Ok(Self::default_checklist()),
            other => other,
        }
    }

    /// Overwrite the file with the whole document, pretty-printed
    pub fn save(&self, checklist: &Checklist) -> Result<(), StorageError> {
        let mut content = serde_json::to_string_pretty(checklist)?;
        content.push('\n');
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        atomic_write(&self.path, content.as_bytes()).map_err(|e| self.write_error(e))?;
        tracing::debug!(path = %self.path.display(), "saved checklist");
        Ok(())
    }

    fn write_error(&self, source: io::Error) -> StorageError {
        StorageError::Write {
            path: self.path.clone(),
            source,
        }
    }

    /// Copy the current file to `<path>.<suffix>`. Without a suffix a
    /// `backup_YYYYMMDD_HHMMSS` timestamp is used. Returns the backup path.
    pub fn backup(&self, suffix: Option<&str>) -> Result<PathBuf, StorageError> {
        if !self.file_exists() {
            return Err(StorageError::NotFound(self.path.clone()));
        }
        let suffix = match suffix {
            Some(s) => s.to_string(),
            None => format!("backup_{}", Local::now().format("%Y%m%d_%H%M%S")),
        };
        let mut name = self.path.clone().into_os_string();
        name.push(".");
        name.push(&suffix);
        let backup_path = PathBuf::from(name);
        fs::copy(&self.path, &backup_path).map_err(|e| StorageError::Write {
            path: backup_path.clone(),
            source: e,
        })?;
        tracing::debug!(backup = %backup_path.display(), "created backup");
        Ok(backup_path)
    }

    /// Size of the file in bytes; 0 when it does not exist
    pub fn file_size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    pub fn last_modified(&self) -> Option<NaiveDateTime> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(DateTime::<Local>::from(modified).naive_local())
    }

    /// Render the checklist as Markdown into `dest`
    pub fn export_markdown(
        &self,
        checklist: &Checklist,
        dest: &Path,
        options: &ExportOptions,
    ) -> Result<(), StorageError> {
        let content = export_markdown(checklist, options);
        fs::write(dest, content).map_err(|e| StorageError::Write {
            path: dest.to_path_buf(),
            source: e,
        })
    }
}
