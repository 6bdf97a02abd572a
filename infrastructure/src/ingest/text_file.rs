//! Plain-text document ingestion

use roundtable_application::ports::document_ingestor::{DocumentIngestor, IngestError};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Default size cap (1 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "csv", "tsv", "json", "toml", "yaml", "yml", "log",
];

/// Loads UTF-8 text files (plain text, markdown and similar)
pub struct TextFileIngestor {
    max_bytes: u64,
}

impl Default for TextFileIngestor {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl TextFileIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

fn is_text_file(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        // extensionless files such as README or NOTES
        None => true,
    }
}

impl DocumentIngestor for TextFileIngestor {
    fn ingest(&self, path: &Path) -> Result<String, IngestError> {
        let path_str = path.display().to_string();

        let metadata = fs::metadata(path).map_err(|_| IngestError::NotFound(path_str.clone()))?;
        if !metadata.is_file() {
            return Err(IngestError::NotFound(path_str));
        }
        if !is_text_file(path) {
            return Err(IngestError::UnsupportedType(path_str));
        }
        if metadata.len() > self.max_bytes {
            return Err(IngestError::TooLarge {
                path: path_str,
                size: metadata.len(),
                limit: self.max_bytes,
            });
        }

        let bytes = fs::read(path).map_err(|e| IngestError::Read {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;
        let text = String::from_utf8(bytes).map_err(|_| IngestError::Read {
            path: path_str.clone(),
            reason: "not valid UTF-8 text".to_string(),
        })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(IngestError::Empty(path_str));
        }
        debug!("Ingested {} ({} bytes)", path_str, text.len());
        Ok(text.to_string())
    }
}
