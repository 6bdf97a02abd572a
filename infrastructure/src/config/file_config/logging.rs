//! Logging configuration from TOML (`[logging]` section)

use super::storage::expand_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write a JSONL record of every gateway call and directive outcome
    pub conversation_log: bool,
    /// Directory for log files; defaults to `$XDG_DATA_HOME/roundtable/logs`
    pub log_dir: Option<String>,
}

impl FileLoggingConfig {
    pub fn resolve_log_dir(&self) -> Option<PathBuf> {
        match &self.log_dir {
            Some(dir) => Some(expand_home(dir)),
            None => dirs::data_dir().map(|d| d.join("roundtable").join("logs")),
        }
    }
}
