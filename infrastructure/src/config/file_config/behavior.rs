//! Behavior configuration from TOML (`[behavior]` section)

use roundtable_application::BehaviorConfig;
use roundtable_application::config::DEFAULT_TIMEOUT_SECONDS;
use roundtable_domain::PermanentNotePolicy;
use serde::{Deserialize, Serialize};

/// Raw behavior configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Timeout in seconds for gateway calls; absent means no timeout
    pub timeout_seconds: Option<u64>,
    /// Keep `!permanentnote` documents when a transcript is cleared
    pub permanent_notes_survive_clear: bool,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
            permanent_notes_survive_clear: true,
        }
    }
}

impl FileBehaviorConfig {
    pub fn to_behavior_config(&self) -> BehaviorConfig {
        BehaviorConfig::from_timeout_seconds(self.timeout_seconds).with_note_policy(
            PermanentNotePolicy {
                survive_clear: self.permanent_notes_survive_clear,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_to_behavior_config() {
        let config = FileBehaviorConfig {
            timeout_seconds: Some(30),
            permanent_notes_survive_clear: false,
        }
        .to_behavior_config();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(!config.note_policy.survive_clear);
    }
}
