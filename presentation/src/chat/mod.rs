//! Interactive chat module
//!
//! Provides a reedline-based interactive chat interface for the panel.

mod command;
mod repl;

pub use command::{ReplCommand, ReplInput, ReplParseError, resolve_session_id};
pub use repl::ChatRepl;
