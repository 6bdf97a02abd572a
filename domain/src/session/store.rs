//! Session store and its command reducer
//!
//! The store is a plain value. Every mutation is expressed as a
//! [`SessionCommand`] and applied with [`SessionStore::apply`], which returns
//! the next store and leaves the current one untouched. Callers decide when
//! to persist and when to publish the new value.

use super::entities::{
    ChatSession, ContextDocument, Message, MessageId, PermanentNotePolicy, SessionId,
};
use crate::core::error::DomainError;
use crate::roster::{Roster, SpecialistName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every way a store can change
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    CreateSession(ChatSession),
    SwitchActive(SessionId),
    DeleteSession(SessionId),
    RenameSession {
        session_id: SessionId,
        title: String,
    },
    Append {
        session_id: SessionId,
        message: Message,
    },
    UpdateMessage {
        session_id: SessionId,
        message_id: MessageId,
        content: String,
    },
    /// Drop the message and everything after it; no-op when not found
    DeleteFromOnward {
        session_id: SessionId,
        message_id: MessageId,
    },
    ClearMessages {
        session_id: SessionId,
        policy: PermanentNotePolicy,
    },
    AddContextDoc {
        session_id: SessionId,
        document: ContextDocument,
    },
    Grant {
        session_id: SessionId,
        name: SpecialistName,
    },
    Revoke {
        session_id: SessionId,
        name: SpecialistName,
    },
    /// Replace the open round's grants and forget who already responded
    ReissueGrants {
        session_id: SessionId,
        names: Vec<SpecialistName>,
    },
    MarkResponded {
        session_id: SessionId,
        name: SpecialistName,
    },
    IncrementRound {
        session_id: SessionId,
    },
    ResetRound {
        session_id: SessionId,
    },
}

impl SessionCommand {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            SessionCommand::CreateSession(_) => "create_session",
            SessionCommand::SwitchActive(_) => "switch_active",
            SessionCommand::DeleteSession(_) => "delete_session",
            SessionCommand::RenameSession { .. } => "rename_session",
            SessionCommand::Append { .. } => "append",
            SessionCommand::UpdateMessage { .. } => "update_message",
            SessionCommand::DeleteFromOnward { .. } => "delete_from_onward",
            SessionCommand::ClearMessages { .. } => "clear_messages",
            SessionCommand::AddContextDoc { .. } => "add_context_doc",
            SessionCommand::Grant { .. } => "grant",
            SessionCommand::Revoke { .. } => "revoke",
            SessionCommand::ReissueGrants { .. } => "reissue_grants",
            SessionCommand::MarkResponded { .. } => "mark_responded",
            SessionCommand::IncrementRound { .. } => "increment_round",
            SessionCommand::ResetRound { .. } => "reset_round",
        }
    }
}

/// All chat sessions plus which one is active
///
/// Invariant: `active_id` is `None` exactly when there are no sessions,
/// otherwise it names a stored session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStore {
    sessions: BTreeMap<SessionId, ChatSession>,
    active_id: Option<SessionId>,
}

impl SessionStore {
    /// A store holding one fresh, active session
    pub fn with_default_session() -> Self {
        let session = ChatSession::new("New chat");
        let id = session.id().clone();
        let mut sessions = BTreeMap::new();
        sessions.insert(id.clone(), session);
        Self {
            sessions,
            active_id: Some(id),
        }
    }

    pub fn active_id(&self) -> Option<&SessionId> {
        self.active_id.as_ref()
    }

    pub fn active(&self) -> Option<&ChatSession> {
        self.active_id.as_ref().and_then(|id| self.sessions.get(id))
    }

    pub fn get(&self, id: &SessionId) -> Option<&ChatSession> {
        self.sessions.get(id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Sessions, oldest first
    pub fn sessions(&self) -> Vec<&ChatSession> {
        let mut all: Vec<_> = self.sessions.values().collect();
        all.sort_by_key(|s| s.created_at());
        all
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Check the structural invariants after loading untrusted data.
    pub fn is_consistent(&self) -> bool {
        match &self.active_id {
            None => self.sessions.is_empty(),
            Some(id) => self.sessions.contains_key(id),
        }
    }

    /// Repair a loaded store: fix the active pointer and drop grants for
    /// specialists no longer on the roster.
    pub fn normalized(mut self, roster: &Roster) -> Self {
        for session in self.sessions.values_mut() {
            session.retain_roster(|name| roster.contains(name));
        }
        if !self.is_consistent() {
            self.active_id = self.fallback_active();
        }
        self
    }

    /// Apply a command, producing the next store.
    pub fn apply(&self, command: SessionCommand) -> Result<SessionStore, DomainError> {
        let mut next = self.clone();
        next.apply_in_place(command)?;
        Ok(next)
    }

    fn apply_in_place(&mut self, command: SessionCommand) -> Result<(), DomainError> {
        match command {
            SessionCommand::CreateSession(session) => {
                let id = session.id().clone();
                self.sessions.insert(id.clone(), session);
                self.active_id = Some(id);
            }
            SessionCommand::SwitchActive(id) => {
                if !self.sessions.contains_key(&id) {
                    return Err(DomainError::UnknownSession(id));
                }
                self.active_id = Some(id);
            }
            SessionCommand::DeleteSession(id) => {
                if self.sessions.remove(&id).is_none() {
                    return Err(DomainError::UnknownSession(id));
                }
                if self.active_id.as_ref() == Some(&id) {
                    self.active_id = self.fallback_active();
                }
            }
            SessionCommand::RenameSession { session_id, title } => {
                let title = title.trim();
                let session = self.session_mut(&session_id)?;
                if !title.is_empty() {
                    session.set_title(title.to_string());
                }
            }
            SessionCommand::Append {
                session_id,
                message,
            } => {
                self.session_mut(&session_id)?
                    .push_message(message)
                    .map_err(DomainError::DuplicateMessage)?;
            }
            SessionCommand::UpdateMessage {
                session_id,
                message_id,
                content,
            } => {
                if !self
                    .session_mut(&session_id)?
                    .update_message(&message_id, &content)
                {
                    return Err(DomainError::MessageNotFound {
                        session_id,
                        message_id,
                    });
                }
            }
            SessionCommand::DeleteFromOnward {
                session_id,
                message_id,
            } => {
                self.session_mut(&session_id)?.truncate_from(&message_id);
            }
            SessionCommand::ClearMessages { session_id, policy } => {
                self.session_mut(&session_id)?.clear_messages(policy);
            }
            SessionCommand::AddContextDoc {
                session_id,
                document,
            } => {
                self.session_mut(&session_id)?.add_context_doc(document);
            }
            SessionCommand::Grant { session_id, name } => {
                self.session_mut(&session_id)?.grant(name);
            }
            SessionCommand::Revoke { session_id, name } => {
                self.session_mut(&session_id)?.revoke(&name);
            }
            SessionCommand::ReissueGrants { session_id, names } => {
                self.session_mut(&session_id)?.reissue_grants(names);
            }
            SessionCommand::MarkResponded { session_id, name } => {
                self.session_mut(&session_id)?
                    .mark_responded(name)
                    .map_err(DomainError::NotGranted)?;
            }
            SessionCommand::IncrementRound { session_id } => {
                self.session_mut(&session_id)?.increment_round();
            }
            SessionCommand::ResetRound { session_id } => {
                self.session_mut(&session_id)?.reset_round();
            }
        }
        Ok(())
    }

    fn session_mut(&mut self, id: &SessionId) -> Result<&mut ChatSession, DomainError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| DomainError::UnknownSession(id.clone()))
    }

    /// Most recently created remaining session
    fn fallback_active(&self) -> Option<SessionId> {
        self.sessions
            .values()
            .max_by_key(|s| s.created_at())
            .map(|s| s.id().clone())
    }
}
