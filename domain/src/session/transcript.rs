//! Transcript rendering
//!
//! A transcript is what a model sees: the message log in order, followed by
//! the session's context documents as synthetic `context` entries. Building
//! it never touches the stored log.

use super::entities::ChatSession;
use crate::core::role::Role;
use serde::{Deserialize, Serialize};

/// One `{role, content}` pair handed to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
}

impl TranscriptEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl ChatSession {
    /// Messages in order, then `Context Document N: ...` entries.
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        let messages = self
            .messages()
            .iter()
            .map(|m| TranscriptEntry::new(m.role.clone(), m.content.clone()));

        let documents = self
            .context_docs()
            .iter()
            .enumerate()
            .map(|(index, doc)| {
                TranscriptEntry::new(
                    Role::Context,
                    format!("Context Document {}: {}", index + 1, doc.content),
                )
            });

        messages.chain(documents).collect()
    }
}
