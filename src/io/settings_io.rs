use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::storage::atomic_write;
use crate::model::settings::Settings;

/// Error type for settings persistence
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("could not serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Read the settings document. A missing file yields defaults. Keys with a
/// value of the wrong type keep their defaults; a file that cannot be read
/// or is not a JSON object is reported and yields defaults.
pub fn read_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read settings");
            return Settings::default();
        }
    };
    match serde_json::from_str::<Settings>(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not parse settings");
            Settings::default()
        }
    }
}

pub fn write_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let write_error = |source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let mut content = serde_json::to_string_pretty(settings)?;
    content.push('\n');
    atomic_write(path, content.as_bytes()).map_err(write_error)
}

/// Settings bound to the file they were loaded from
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    pub settings: Settings,
}

impl SettingsStore {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = read_settings_from(&path);
        SettingsStore { path, settings }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        write_settings_to(&self.path, &self.settings)?;
        tracing::debug!(path = %self.path.display(), "saved settings");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.settings.get(key)
    }

    /// Set a key from command-line text. Text that parses as JSON is stored
    /// as that value, anything else as a plain string.
    pub fn set_from_str(&mut self, key: &str, raw: &str) -> Result<(), SettingsError> {
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        self.settings
            .set(key, value)
            .map_err(|message| SettingsError::InvalidValue {
                key: key.to_string(),
                message,
            })
    }

    pub fn reset_to_defaults(&mut self) {
        self.settings = Settings::default();
    }

    /// Recent files that still exist on disk
    pub fn recent_files_existing(&self) -> Vec<String> {
        self.settings
            .recent_files
            .iter()
            .filter(|p| Path::new(p).exists())
            .cloned()
            .collect()
    }

    /// Drop recent entries whose file is gone; returns how many were dropped
    pub fn cleanup_recent_files(&mut self) -> usize {
        let before = self.settings.recent_files.len();
        self.settings.recent_files.retain(|p| Path::new(p).exists());
        before - self.settings.recent_files.len()
    }

    /// The whole document as JSON
    pub fn export(&self) -> serde_json::Value {
        serde_json::to_value(&self.settings).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::load(dir.path().join("settings.json"));
        assert_eq!(store.settings, Settings::default());
    }

    #[test]
    fn corrupted_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json at all").unwrap();
        let store = SettingsStore::load(&path);
        assert_eq!(store.settings, Settings::default());
        // The broken file is left for the user to inspect
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json at all");
    }

    #[test]
    fn partial_file_merges_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"input_bg_color": "lightyellow", "theme": "dark"}"#).unwrap();
        let store = SettingsStore::load(&path);
        assert_eq!(store.settings.input_bg_color, "lightyellow");
        assert_eq!(store.settings.max_history, 20);
        assert_eq!(store.get("theme"), Some(json!("dark")));
    }

    #[test]
    fn wrongly_typed_keys_keep_the_rest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"input_bg_color": "lightyellow", "max_history": "30", "recent_files": "x", "theme": "dark"}"#,
        )
        .unwrap();
        let store = SettingsStore::load(&path);
        assert_eq!(store.settings.input_bg_color, "lightyellow");
        assert_eq!(store.settings.max_history, 20);
        assert!(store.settings.recent_files.is_empty());
        assert_eq!(store.get("theme"), Some(json!("dark")));

        let path = dir.path().join("other.json");
        fs::write(&path, r#"{"input_bg_color": 5, "recent_files": ["/a.json"], "max_history": 7}"#)
            .unwrap();
        let store = SettingsStore::load(&path);
        assert_eq!(store.settings.input_bg_color, "white");
        assert_eq!(store.settings.recent_files, vec!["/a.json"]);
        assert_eq!(store.settings.max_history, 7);
    }

    #[test]
    fn save_and_reload_keeps_extra_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::load(&path);
        store.settings.add_recent_file("/tmp/a.json");
        store.set_from_str("font_size", "12").unwrap();
        store.set_from_str("theme", "dark").unwrap();
        store.save().unwrap();

        let reloaded = SettingsStore::load(&path);
        assert_eq!(reloaded.settings.recent_files, vec!["/tmp/a.json"]);
        assert_eq!(reloaded.get("font_size"), Some(json!(12)));
        assert_eq!(reloaded.get("theme"), Some(json!("dark")));
    }

    #[test]
    fn set_from_str_validates_typed_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = SettingsStore::load(dir.path().join("settings.json"));
        store.set_from_str("max_history", "50").unwrap();
        assert_eq!(store.settings.max_history, 50);
        assert!(matches!(
            store.set_from_str("max_history", "zero"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert_eq!(store.settings.max_history, 50);
    }

    #[test]
    fn reset_restores_defaults() {
        let dir = TempDir::new().unwrap();
        let mut store = SettingsStore::load(dir.path().join("settings.json"));
        store.settings.input_bg_color = "black".into();
        store.reset_to_defaults();
        assert_eq!(store.settings, Settings::default());
    }

    #[test]
    fn cleanup_drops_missing_files() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present.json");
        fs::write(&present, "{}").unwrap();
        let present = present.to_string_lossy().into_owned();
        let missing = dir.path().join("missing.json").to_string_lossy().into_owned();

        let mut store = SettingsStore::load(dir.path().join("settings.json"));
        store.settings.add_recent_file(&missing);
        store.settings.add_recent_file(&present);
        assert_eq!(store.recent_files_existing(), vec![present.clone()]);
        assert_eq!(store.cleanup_recent_files(), 1);
        assert_eq!(store.settings.recent_files, vec![present]);
    }
}
