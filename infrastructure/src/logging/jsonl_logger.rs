//! JSONL conversation log.
//!
//! Each [`ConversationEvent`] becomes one JSON line carrying its `type` and
//! `timestamp` next to the payload fields. Files are opened in append mode so
//! several runs can share one log.

use chrono::{DateTime, Local, SecondsFormat};
use roundtable_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Writes conversation events as JSON lines.
///
/// The writer sits behind a `Mutex`; every record is flushed as it is written.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// Returns `None` when the file cannot be opened; callers fall back to
    /// running without a conversation log.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create conversation log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Could not open conversation log file {}: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        debug!("Conversation log at {}", path.display());
        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Open a log named after the start time inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>, started: DateTime<Local>) -> Option<Self> {
        Self::new(dir.as_ref().join(Self::file_name(started)))
    }

    fn file_name(started: DateTime<Local>) -> String {
        format!(
            "roundtable-{}.conversation.jsonl",
            started.format("%Y%m%d-%H%M%S")
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: ConversationEvent) -> Value {
        let timestamp = event
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        match event.payload {
            Value::Object(mut map) => {
                map.insert("type".into(), Value::String(event.event_type.into()));
                map.insert("timestamp".into(), Value::String(timestamp));
                Value::Object(map)
            }
            other => {
                let mut map = Map::new();
                map.insert("type".into(), Value::String(event.event_type.into()));
                map.insert("timestamp".into(), Value::String(timestamp));
                map.insert("data".into(), other);
                Value::Object(map)
            }
        }
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(line) = serde_json::to_string(&Self::record(event)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
