//! REPL configuration from TOML (`[repl]` section)

use super::storage::expand_home;
use serde::{Deserialize, Serialize};

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show progress indicators
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

impl FileReplConfig {
    /// History file with `~/` expanded; `None` leaves the choice to the REPL
    pub fn resolve_history_file(&self) -> Option<String> {
        self.history_file
            .as_deref()
            .map(|path| expand_home(path).to_string_lossy().into_owned())
    }
}
