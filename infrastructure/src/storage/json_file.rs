//! JSON file session storage
//!
//! The whole store is written as one versioned JSON document. Writes go to a
//! temporary file in the same directory, are synced, then renamed over the
//! target, so a crash mid-write leaves the previous file intact.

use roundtable_application::ports::session_storage::{SessionStorage, StorageError};
use roundtable_domain::SessionStore;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    store: &'a SessionStore,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    store: SessionStore,
}

/// [`SessionStorage`] backed by a single JSON file
pub struct JsonFileSessionStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sessions.json".to_string());
        self.path
            .with_file_name(format!(".{}.tmp.{}", file_name, std::process::id()))
    }
}

impl SessionStorage for JsonFileSessionStorage {
    fn load(&self) -> Result<Option<SessionStore>, StorageError> {
        if !self.path.exists() {
            debug!("No session file at {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let envelope: Envelope =
            serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        if envelope.version != FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: envelope.version,
                expected: FORMAT_VERSION,
            });
        }

        if !envelope.store.is_consistent() {
            warn!(
                "Session file {} has an invalid active session, repairing",
                self.path.display()
            );
        }

        Ok(Some(envelope.store))
    }

    fn save(&self, store: &SessionStore) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(&EnvelopeRef {
            version: FORMAT_VERSION,
            store,
        })
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp_path = self.temp_path();
        let write = || -> std::io::Result<()> {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(json.as_bytes())?;
            tmp_file.sync_all()?;
            drop(tmp_file);
            fs::rename(&tmp_path, &self.path)
        };

        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(e));
        }

        debug!("Saved {} session(s) to {}", store.len(), self.path.display());
        Ok(())
    }
}
