//! Prompt domain
//!
//! System prompts for the moderator and each specialist, built from the roster.

mod template;

pub use template::PromptTemplate;
