use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of entries kept in the recent-files list
pub const MAX_RECENT_FILES: usize = 10;

/// User preferences stored in the settings file.
///
/// Loading merges the file over the defaults key by key: a typed key with a
/// value of the wrong shape keeps its default and the rest of the document
/// still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, Value>")]
pub struct Settings {
    /// Background colour of the task input box (hex or colour name)
    pub input_bg_color: String,
    /// Recently opened checklist files, most recent first
    pub recent_files: Vec<String>,
    /// Number of undo steps kept per session
    pub max_history: usize,
    /// Any other keys, preserved in file order
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            input_bg_color: default_input_bg_color(),
            recent_files: Vec::new(),
            max_history: default_max_history(),
            extra: IndexMap::new(),
        }
    }
}

fn default_input_bg_color() -> String {
    "white".to_string()
}

fn default_max_history() -> usize {
    20
}

impl From<IndexMap<String, Value>> for Settings {
    fn from(map: IndexMap<String, Value>) -> Self {
        let mut settings = Settings::default();
        for (key, value) in map {
            let known = matches!(key.as_str(), "input_bg_color" | "recent_files" | "max_history");
            if !known {
                settings.extra.insert(key, value);
            } else if let Err(e) = settings.set(&key, value) {
                tracing::warn!(key = %key, error = %e, "ignoring setting, using default");
            }
        }
        settings
    }
}

impl Settings {
    /// Move `path` to the front of the recent list, dropping duplicates and
    /// anything past [`MAX_RECENT_FILES`].
    pub fn add_recent_file(&mut self, path: &str) {
        self.recent_files.retain(|p| p != path);
        self.recent_files.insert(0, path.to_string());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    pub fn remove_recent_file(&mut self, path: &str) -> bool {
        let before = self.recent_files.len();
        self.recent_files.retain(|p| p != path);
        self.recent_files.len() != before
    }

    pub fn clear_recent_files(&mut self) {
        self.recent_files.clear();
    }

    /// Look up any setting by key, typed fields included
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "input_bg_color" => Some(Value::from(self.input_bg_color.clone())),
            "recent_files" => Some(Value::from(self.recent_files.clone())),
            "max_history" => Some(Value::from(self.max_history)),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// Set a setting by key. Typed keys must receive a value of the right
    /// shape; other keys are stored as-is.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), String> {
        match key {
            "input_bg_color" => {
                self.input_bg_color = value
                    .as_str()
                    .ok_or("input_bg_color must be a string")?
                    .to_string();
            }
            "recent_files" => {
                self.recent_files = serde_json::from_value(value)
                    .map_err(|_| "recent_files must be a list of paths".to_string())?;
                self.recent_files.truncate(MAX_RECENT_FILES);
            }
            "max_history" => {
                let n = value
                    .as_u64()
                    .filter(|n| *n > 0)
                    .ok_or("max_history must be a positive integer")?;
                self.max_history = n as usize;
            }
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_on_empty_object() {
        let s: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.input_bg_color, "white");
        assert_eq!(s.max_history, 20);
    }

    #[test]
    fn extra_keys_preserved_in_order() {
        let s: Settings =
            serde_json::from_str(r##"{"zeta":1,"input_bg_color":"#eee","alpha":"x"}"##).unwrap();
        assert_eq!(s.input_bg_color, "#eee");
        let keys: Vec<&str> = s.extra.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        let out = serde_json::to_string(&s).unwrap();
        assert!(out.find("zeta").unwrap() < out.find("alpha").unwrap());
    }

    #[test]
    fn recent_files_most_recent_first() {
        let mut s = Settings::default();
        s.add_recent_file("/a.json");
        s.add_recent_file("/b.json");
        s.add_recent_file("/a.json");
        assert_eq!(s.recent_files, vec!["/a.json", "/b.json"]);
    }

    #[test]
    fn recent_files_capped() {
        let mut s = Settings::default();
        for i in 0..15 {
            s.add_recent_file(&format!("/f{}.json", i));
        }
        assert_eq!(s.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(s.recent_files[0], "/f14.json");
        assert_eq!(s.recent_files[9], "/f5.json");
    }

    #[test]
    fn remove_recent_file() {
        let mut s = Settings::default();
        s.add_recent_file("/a.json");
        assert!(s.remove_recent_file("/a.json"));
        assert!(!s.remove_recent_file("/a.json"));
    }

    #[test]
    fn set_typed_and_extra() {
        let mut s = Settings::default();
        s.set("max_history", serde_json::json!(5)).unwrap();
        assert_eq!(s.max_history, 5);
        assert!(s.set("max_history", serde_json::json!("many")).is_err());
        assert!(s.set("max_history", serde_json::json!(0)).is_err());
        s.set("theme", serde_json::json!("dark")).unwrap();
        assert_eq!(s.get("theme"), Some(serde_json::json!("dark")));
        assert_eq!(s.get("input_bg_color"), Some(serde_json::json!("white")));
        assert!(s.get("missing").is_none());
    }
}
