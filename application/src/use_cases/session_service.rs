//! Session service
//!
//! Owns the live [`SessionStore`] value. Every mutation goes through
//! [`SessionService::apply`]: the command is applied to a copy, the copy is
//! saved, and only then does it replace the live value. A command that fails,
//! or whose save fails, leaves both memory and disk unchanged.
//!
//! The store lock is only held for that apply/save/replace step, never
//! across a gateway call, so different sessions can run rounds concurrently.
//! A per-session busy flag keeps one round in flight per session.

use crate::ports::session_storage::{SessionStorage, StorageError};
use roundtable_domain::{
    ChatSession, DomainError, Roster, SessionCommand, SessionId, SessionStore,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors returned by [`SessionService`]
#[derive(Error, Debug)]
pub enum SessionServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Failed to persist sessions: {0}")]
    Storage(#[from] StorageError),

    #[error("Session {0} is busy with a round in flight")]
    SessionBusy(SessionId),

    #[error("No active session")]
    NoActiveSession,
}

impl SessionServiceError {
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionServiceError::SessionBusy(_))
    }
}

/// Live session state plus its persistence
pub struct SessionService {
    store: Mutex<SessionStore>,
    storage: Arc<dyn SessionStorage>,
    busy: Mutex<HashSet<SessionId>>,
}

impl SessionService {
    /// Load persisted sessions, or start with one empty default session.
    ///
    /// Loaded data is repaired against the roster: grants for specialists
    /// that are no longer configured are dropped.
    pub fn open(
        storage: Arc<dyn SessionStorage>,
        roster: &Roster,
    ) -> Result<Self, SessionServiceError> {
        let store = match storage.load()? {
            Some(store) if !store.is_empty() => {
                info!("Restored {} session(s)", store.len());
                store.normalized(roster)
            }
            _ => {
                info!("No saved sessions, starting a new one");
                let store = SessionStore::with_default_session();
                storage.save(&store)?;
                store
            }
        };

        Ok(Self {
            store: Mutex::new(store),
            storage,
            busy: Mutex::new(HashSet::new()),
        })
    }

    fn lock_store(&self) -> MutexGuard<'_, SessionStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_busy(&self) -> MutexGuard<'_, HashSet<SessionId>> {
        self.busy.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current store
    pub fn snapshot(&self) -> SessionStore {
        self.lock_store().clone()
    }

    pub fn session(&self, id: &SessionId) -> Option<ChatSession> {
        self.lock_store().get(id).cloned()
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.lock_store().active_id().cloned()
    }

    /// The active session id, or [`SessionServiceError::NoActiveSession`]
    pub fn require_active(&self) -> Result<SessionId, SessionServiceError> {
        self.active_id().ok_or(SessionServiceError::NoActiveSession)
    }

    /// Apply one command, persist, publish.
    pub fn apply(&self, command: SessionCommand) -> Result<(), SessionServiceError> {
        self.apply_all([command])
    }

    /// Apply several commands as one unit: all of them or none.
    pub fn apply_all(
        &self,
        commands: impl IntoIterator<Item = SessionCommand>,
    ) -> Result<(), SessionServiceError> {
        let mut current = self.lock_store();
        let mut next: Option<SessionStore> = None;

        for command in commands {
            if let SessionCommand::DeleteSession(id) = &command
                && self.is_busy(id)
            {
                return Err(SessionServiceError::SessionBusy(id.clone()));
            }
            debug!("Applying {}", command.kind());
            let base = next.as_ref().unwrap_or(&*current);
            next = Some(base.apply(command)?);
        }

        let Some(next) = next else {
            return Ok(());
        };

        if let Err(e) = self.storage.save(&next) {
            warn!("Session save failed, keeping previous state: {}", e);
            return Err(e.into());
        }
        *current = next;
        Ok(())
    }

    /// Create a session, make it active, return its id.
    pub fn create_session(&self, title: &str) -> Result<SessionId, SessionServiceError> {
        let title = match title.trim() {
            "" => "New chat",
            t => t,
        };
        let session = ChatSession::new(title);
        let id = session.id().clone();
        self.apply(SessionCommand::CreateSession(session))?;
        info!("Created session {}", id.short());
        Ok(id)
    }

    /// Mark a session as having a round in flight.
    ///
    /// Fails with [`SessionServiceError::SessionBusy`] if one already is, and
    /// with `UnknownSession` if the session does not exist. The flag clears
    /// when the guard drops.
    pub fn begin_round(&self, id: &SessionId) -> Result<BusyGuard<'_>, SessionServiceError> {
        if !self.lock_store().contains(id) {
            return Err(DomainError::UnknownSession(id.clone()).into());
        }
        if !self.lock_busy().insert(id.clone()) {
            return Err(SessionServiceError::SessionBusy(id.clone()));
        }
        debug!("Session {} busy", id.short());
        Ok(BusyGuard {
            service: self,
            session_id: id.clone(),
        })
    }

    pub fn is_busy(&self, id: &SessionId) -> bool {
        self.lock_busy().contains(id)
    }
}

/// Clears a session's busy flag on drop
pub struct BusyGuard<'a> {
    service: &'a SessionService,
    session_id: SessionId,
}

impl BusyGuard<'_> {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl std::fmt::Debug for BusyGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyGuard")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.service.lock_busy().remove(&self.session_id);
        debug!("Session {} idle", self.session_id.short());
    }
}
