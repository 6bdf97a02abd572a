//! Chat session domain.
//!
//! - [`entities::ChatSession`]: one conversation with the panel
//! - [`entities::Message`]: a single transcript entry
//! - [`store::SessionStore`]: all sessions, mutated through [`store::SessionCommand`]
//! - [`transcript::TranscriptEntry`]: what a model is shown

pub mod entities;
pub mod store;
pub mod transcript;
