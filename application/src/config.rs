//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave,
//! such as gateway timeouts and the permanent-note policy.

use roundtable_domain::PermanentNotePolicy;
use std::time::Duration;

/// Default gateway timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Application behavior configuration.
///
/// Controls runtime behavior of use cases like timeout limits for LLM API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorConfig {
    /// Maximum time to wait for a gateway reply before timing out.
    pub timeout: Option<Duration>,
    /// What `ClearMessages` does with permanent notes
    pub note_policy: PermanentNotePolicy,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
            note_policy: PermanentNotePolicy::default(),
        }
    }
}

impl BehaviorConfig {
    /// Creates a BehaviorConfig with a timeout specified in seconds.
    pub fn with_timeout_seconds(seconds: u64) -> Self {
        Self {
            timeout: Some(Duration::from_secs(seconds)),
            ..Self::default()
        }
    }

    /// Creates a BehaviorConfig from an optional timeout in seconds.
    ///
    /// If `seconds` is `None`, no timeout is applied.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            timeout: seconds.map(Duration::from_secs),
            ..Self::default()
        }
    }

    pub fn with_note_policy(mut self, policy: PermanentNotePolicy) -> Self {
        self.note_policy = policy;
        self
    }
}
