//! Durable session storage port
//!
//! The whole [`SessionStore`] is saved after every successful mutation and
//! loaded once at start-up.

use roundtable_domain::SessionStore;
use std::sync::Mutex;
use thiserror::Error;

/// Errors from a storage adapter
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt session file {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Unsupported session file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Where sessions live between runs
///
/// Calls are synchronous and expected to be quick; the service invokes them
/// while holding its store lock so that writes land in mutation order.
pub trait SessionStorage: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<SessionStore>, StorageError>;

    fn save(&self, store: &SessionStore) -> Result<(), StorageError>;
}

/// Storage that keeps the last saved store in memory
#[derive(Default)]
pub struct InMemorySessionStorage {
    saved: Mutex<Option<SessionStore>>,
    fail_saves: Mutex<bool>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing store, as if loaded from disk
    pub fn with_store(store: SessionStore) -> Self {
        Self {
            saved: Mutex::new(Some(store)),
            fail_saves: Mutex::new(false),
        }
    }

    /// Make subsequent saves fail (for exercising error paths)
    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_saves.lock() {
            *flag = fail;
        }
    }

    /// The last store successfully saved
    pub fn saved(&self) -> Option<SessionStore> {
        self.saved.lock().ok().and_then(|s| s.clone())
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn load(&self) -> Result<Option<SessionStore>, StorageError> {
        Ok(self.saved())
    }

    fn save(&self, store: &SessionStore) -> Result<(), StorageError> {
        if self.fail_saves.lock().map(|f| *f).unwrap_or(false) {
            return Err(StorageError::Io {
                path: "<memory>".to_string(),
                source: std::io::Error::other("save disabled"),
            });
        }
        let mut saved = self
            .saved
            .lock()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        *saved = Some(store.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let storage = InMemorySessionStorage::new();
        assert!(storage.load().unwrap().is_none());

        let store = SessionStore::with_default_session();
        storage.save(&store).unwrap();
        assert_eq!(storage.load().unwrap(), Some(store));
    }

    #[test]
    fn test_failing_save_keeps_previous() {
        let first = SessionStore::with_default_session();
        let storage = InMemorySessionStorage::with_store(first.clone());
        storage.set_fail_saves(true);

        assert!(storage.save(&SessionStore::default()).is_err());
        assert_eq!(storage.load().unwrap(), Some(first));
    }
}
