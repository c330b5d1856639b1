use std::path::PathBuf;

/// File name of the default checklist in the home directory
pub const CHECKLIST_FILE_NAME: &str = ".simple_checklist.json";
/// File name of the settings document in the home directory
pub const SETTINGS_FILE_NAME: &str = ".simple_checklist_settings.json";

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

pub fn default_checklist_path() -> PathBuf {
    dirs_home().join(CHECKLIST_FILE_NAME)
}

pub fn default_settings_path() -> PathBuf {
    dirs_home().join(SETTINGS_FILE_NAME)
}

/// An explicit path if given, else the default
pub fn resolve(explicit: Option<PathBuf>, default: fn() -> PathBuf) -> PathBuf {
    explicit.unwrap_or_else(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_live_in_home() {
        let checklist = default_checklist_path();
        assert!(checklist.ends_with(CHECKLIST_FILE_NAME));
        let settings = default_settings_path();
        assert_eq!(checklist.parent(), settings.parent());
    }

    #[test]
    fn explicit_path_wins() {
        let path = resolve(Some(PathBuf::from("/tmp/x.json")), default_checklist_path);
        assert_eq!(path, PathBuf::from("/tmp/x.json"));
        assert_eq!(resolve(None, default_settings_path), default_settings_path());
    }
}
