//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain/application types
//! at the edge.

mod behavior;
mod gateway;
mod logging;
mod repl;
mod roster;
mod storage;

pub use behavior::FileBehaviorConfig;
pub use gateway::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL, FileGatewayConfig};
pub use logging::FileLoggingConfig;
pub use repl::FileReplConfig;
pub use roster::{FileRosterConfig, FileSpecialistConfig};
pub use storage::FileStorageConfig;

use roundtable_domain::normalize_role_name;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("roster.specialists cannot be empty")]
    EmptyRoster,

    #[error("roster.specialists: duplicate specialist '{0}'")]
    DuplicateSpecialist(String),

    #[error("roster.specialists: '{0}' is not a usable specialist name")]
    InvalidSpecialist(String),

    #[error("behavior.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("gateway.model cannot be empty")]
    EmptyModelName,

    #[error("gateway.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("gateway.temperature must be between 0 and 2 (got {0})")]
    InvalidTemperature(f32),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Panel members
    pub roster: FileRosterConfig,
    /// Model provider endpoint
    pub gateway: FileGatewayConfig,
    /// Timeouts and note policy
    pub behavior: FileBehaviorConfig,
    /// Where sessions are saved
    pub storage: FileStorageConfig,
    /// Conversation log and log file location
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        // Roster
        if self.roster.specialists.is_empty() {
            issues.push(ConfigValidationError::EmptyRoster);
        }
        let mut seen = HashSet::new();
        for specialist in &self.roster.specialists {
            let name = normalize_role_name(&specialist.name);
            if name.is_empty() || matches!(name.as_str(), "user" | "moderator" | "context") {
                issues.push(ConfigValidationError::InvalidSpecialist(
                    specialist.name.clone(),
                ));
            } else if !seen.insert(name.clone()) {
                issues.push(ConfigValidationError::DuplicateSpecialist(name));
            }
        }

        // Behavior
        if let Some(0) = self.behavior.timeout_seconds {
            issues.push(ConfigValidationError::InvalidTimeout);
        }

        // Gateway
        if self.gateway.model.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyModelName);
        }
        if self.gateway.base_url.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyBaseUrl);
        }
        if !(0.0..=2.0).contains(&self.gateway.temperature) {
            issues.push(ConfigValidationError::InvalidTemperature(
                self.gateway.temperature,
            ));
        }

        issues
    }
}
