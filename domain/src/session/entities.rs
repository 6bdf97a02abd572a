//! Session domain entities

use crate::core::role::Role;
use crate::roster::SpecialistName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, globally unique message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MessageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Chat session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to tell sessions apart in a listing
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message in the panel transcript (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn moderator(content: impl Into<String>) -> Self {
        Self::new(Role::Moderator, content)
    }

    pub fn assistant(name: SpecialistName, content: impl Into<String>) -> Self {
        Self::new(Role::Assistant(name), content)
    }
}

/// Which note directive produced a context document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteTier {
    /// `!note` or an attached document: lives as long as the transcript
    #[default]
    Session,
    /// `!permanentnote`: may outlive a transcript clear, see [`PermanentNotePolicy`]
    Permanent,
}

/// Plain text made available to every model invocation in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDocument {
    pub content: String,
    #[serde(default)]
    pub tier: NoteTier,
    pub added_at: DateTime<Utc>,
}

impl ContextDocument {
    pub fn new(content: impl Into<String>, tier: NoteTier) -> Self {
        Self {
            content: content.into(),
            tier,
            added_at: Utc::now(),
        }
    }

    pub fn session(content: impl Into<String>) -> Self {
        Self::new(content, NoteTier::Session)
    }

    pub fn permanent(content: impl Into<String>) -> Self {
        Self::new(content, NoteTier::Permanent)
    }
}

/// What happens to permanent notes when a transcript is cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentNotePolicy {
    pub survive_clear: bool,
}

impl Default for PermanentNotePolicy {
    fn default() -> Self {
        Self {
            survive_clear: true,
        }
    }
}

/// One conversation with the panel (Entity)
///
/// Fields are private: every change goes through
/// [`SessionStore::apply`](super::store::SessionStore::apply) so that the
/// round invariants hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    id: SessionId,
    title: String,
    created_at: DateTime<Utc>,
    messages: Vec<Message>,
    context_docs: Vec<ContextDocument>,
    conversation_round: u32,
    /// Ordered set, in grant order
    allowed_assistants: Vec<SpecialistName>,
    responded_assistants: Vec<SpecialistName>,
}

impl ChatSession {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(SessionId::generate(), title)
    }

    pub fn with_id(id: SessionId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            created_at: Utc::now(),
            messages: Vec::new(),
            context_docs: Vec::new(),
            conversation_round: 0,
            allowed_assistants: Vec::new(),
            responded_assistants: Vec::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn context_docs(&self) -> &[ContextDocument] {
        &self.context_docs
    }

    pub fn conversation_round(&self) -> u32 {
        self.conversation_round
    }

    pub fn allowed_assistants(&self) -> &[SpecialistName] {
        &self.allowed_assistants
    }

    pub fn responded_assistants(&self) -> &[SpecialistName] {
        &self.responded_assistants
    }

    pub fn is_allowed(&self, name: &SpecialistName) -> bool {
        self.allowed_assistants.contains(name)
    }

    /// A round is open while grants are recorded
    pub fn round_open(&self) -> bool {
        !self.allowed_assistants.is_empty()
    }

    // ==================== Mutators (store-internal) ====================

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn push_message(&mut self, mut message: Message) -> Result<(), MessageId> {
        if self.messages.iter().any(|m| m.id == message.id) {
            return Err(message.id);
        }
        if let Some(last) = self.messages.last()
            && message.timestamp < last.timestamp
        {
            message.timestamp = last.timestamp;
        }
        self.messages.push(message);
        Ok(())
    }

    /// Returns false when the message does not exist
    pub(crate) fn update_message(&mut self, id: &MessageId, content: &str) -> bool {
        match self.messages.iter_mut().find(|m| &m.id == id) {
            Some(message) => {
                if !content.trim().is_empty() {
                    message.content = content.to_string();
                }
                true
            }
            None => false,
        }
    }

    pub(crate) fn truncate_from(&mut self, id: &MessageId) {
        if let Some(idx) = self.messages.iter().position(|m| &m.id == id) {
            self.messages.truncate(idx);
        }
    }

    pub(crate) fn clear_messages(&mut self, policy: PermanentNotePolicy) {
        self.messages.clear();
        self.context_docs
            .retain(|doc| policy.survive_clear && doc.tier == NoteTier::Permanent);
    }

    pub(crate) fn add_context_doc(&mut self, document: ContextDocument) {
        self.context_docs.push(document);
    }

    pub(crate) fn grant(&mut self, name: SpecialistName) {
        if !self.allowed_assistants.contains(&name) {
            self.allowed_assistants.push(name);
        }
    }

    pub(crate) fn revoke(&mut self, name: &SpecialistName) {
        self.allowed_assistants.retain(|n| n != name);
        self.responded_assistants.retain(|n| n != name);
    }

    pub(crate) fn reissue_grants(&mut self, names: Vec<SpecialistName>) {
        self.allowed_assistants.clear();
        self.responded_assistants.clear();
        for name in names {
            self.grant(name);
        }
    }

    pub(crate) fn mark_responded(&mut self, name: SpecialistName) -> Result<(), SpecialistName> {
        if !self.allowed_assistants.contains(&name) {
            return Err(name);
        }
        if !self.responded_assistants.contains(&name) {
            self.responded_assistants.push(name);
        }
        Ok(())
    }

    pub(crate) fn increment_round(&mut self) {
        self.conversation_round = self.conversation_round.saturating_add(1);
    }

    pub(crate) fn reset_round(&mut self) {
        self.conversation_round = 0;
        self.allowed_assistants.clear();
        self.responded_assistants.clear();
    }

    pub(crate) fn retain_roster(&mut self, keep: impl Fn(&SpecialistName) -> bool) {
        self.allowed_assistants.retain(|n| keep(n));
        self.responded_assistants.retain(|n| keep(n));
    }
}
