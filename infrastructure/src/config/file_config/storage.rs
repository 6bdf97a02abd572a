//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Session file; defaults to the platform data dir
    pub sessions_path: Option<String>,
}

impl FileStorageConfig {
    /// Configured path (with `~` expanded), else
    /// `$XDG_DATA_HOME/roundtable/sessions.json`
    pub fn resolve_sessions_path(&self) -> Option<PathBuf> {
        match &self.sessions_path {
            Some(path) => Some(expand_home(path)),
            None => dirs::data_dir().map(|d| d.join("roundtable").join("sessions.json")),
        }
    }
}

/// Expand a leading `~/` to the home directory
pub(crate) fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path() {
        let config = FileStorageConfig {
            sessions_path: Some("/tmp/rt/sessions.json".to_string()),
        };
        assert_eq!(
            config.resolve_sessions_path(),
            Some(PathBuf::from("/tmp/rt/sessions.json"))
        );
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("relative/file"), PathBuf::from("relative/file"));
    }
}
