//! Domain layer for roundtable
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Panel
//!
//! A human converses with a panel of specialist agents. A distinguished
//! moderator agent decides, each round, who speaks and when control returns
//! to the human.
//!
//! ## Directives
//!
//! The moderator steers the panel with `!command` lines (`!allowspeak`,
//! `!deny`, `!yield`, ...). They are parsed against the [`Roster`] and folded
//! into a [`TurnPlan`].
//!
//! ## Session store
//!
//! All conversation state lives in a [`SessionStore`] value that only changes
//! through [`SessionCommand`]s.

pub mod core;
pub mod directive;
pub mod prompt;
pub mod roster;
pub mod round;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use core::{error::DomainError, role::Role};
pub use directive::{
    grammar::{Directive, DirectiveParser, ParsedDirective, is_ready_sentinel},
    plan::{DirectiveSource, PlanEffect, SESSION_READY_NOTICE, TurnPlan, YIELD_NOTICE},
};
pub use prompt::PromptTemplate;
pub use roster::{RoleRef, Roster, Specialist, SpecialistName, normalize_role_name};
pub use round::{RoundOutcome, RoundState, TurnResult};
pub use session::{
    entities::{
        ChatSession, ContextDocument, Message, MessageId, NoteTier, PermanentNotePolicy, SessionId,
    },
    store::{SessionCommand, SessionStore},
    transcript::TranscriptEntry,
};
