//! Domain error types

use crate::roster::SpecialistName;
use crate::session::entities::{MessageId, SessionId};
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("Message {message_id} not found in session {session_id}")]
    MessageNotFound {
        session_id: SessionId,
        message_id: MessageId,
    },

    #[error("Message id {0} already exists in this session")]
    DuplicateMessage(MessageId),

    #[error("{0} has not been granted the floor")]
    NotGranted(SpecialistName),

    #[error("Malformed directive !{command}: {reason}")]
    MalformedDirective { command: String, reason: String },

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),
}

impl DomainError {
    /// Check if this error refers to a missing session
    pub fn is_unknown_session(&self) -> bool {
        matches!(self, DomainError::UnknownSession(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_session_display() {
        let error = DomainError::UnknownSession(SessionId::from("abc"));
        assert_eq!(error.to_string(), "Unknown session: abc");
        assert!(error.is_unknown_session());
    }

    #[test]
    fn test_malformed_directive_display() {
        let error = DomainError::MalformedDirective {
            command: "allowspeak".to_string(),
            reason: "missing role name".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Malformed directive !allowspeak: missing role name"
        );
        assert!(!error.is_unknown_session());
    }
}
