//! Document ingestion port
//!
//! Turns a user-supplied file into plain text for a session context document.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),

    #[error("Document too large: {path} is {size} bytes (limit {limit})")]
    TooLarge { path: String, size: u64, limit: u64 },

    #[error("Document is empty: {0}")]
    Empty(String),

    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },
}

/// Loads a document's text content
pub trait DocumentIngestor: Send + Sync {
    fn ingest(&self, path: &Path) -> Result<String, IngestError>;
}
