//! Document ingestion adapters

mod text_file;

pub use text_file::{DEFAULT_MAX_BYTES, TextFileIngestor};
