//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod gateway;
pub mod ingest;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBehaviorConfig, FileConfig, FileGatewayConfig,
    FileLoggingConfig, FileReplConfig, FileRosterConfig, FileStorageConfig,
};
pub use gateway::{OpenAiGateway, OpenAiGatewayConfig};
pub use ingest::TextFileIngestor;
pub use logging::JsonlConversationLogger;
pub use storage::JsonFileSessionStorage;
