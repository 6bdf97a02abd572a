//! Turn plan
//!
//! Folds an ordered list of parsed directives into the set of changes one
//! reply makes to a session. The precedence rules live here:
//!
//! - A `!yield` anywhere in the reply discards every grant and deny in it and
//!   resets the round.
//! - Grants and denies compose in textual order with set semantics; a later
//!   `!deny` cancels an earlier `!allowspeak` and vice versa.
//! - Notes, team messages, `!user` injections and notices for unknown or
//!   malformed commands always apply, in textual order.

use super::grammar::{Directive, ParsedDirective};
use crate::roster::{RoleRef, SpecialistName};
use crate::session::entities::{ContextDocument, Message, NoteTier, SessionId};
use crate::session::store::SessionCommand;

pub const YIELD_NOTICE: &str = "Moderation: Control is now yielded back to the user.";
pub const SESSION_READY_NOTICE: &str = "Session started. Please enter your prompt.";
pub const SESSION_NOTE_NOTICE: &str = "Note added for the current session.";
pub const PERMANENT_NOTE_NOTICE: &str = "Permanent note added.";

/// Who issued the directives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveSource {
    /// Parsed from a moderator reply; grants re-issue the round and dispatch
    Moderator,
    /// Typed by the human operator; grants only edit the open round
    Operator,
}

/// A transcript-visible change produced by a directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanEffect {
    /// Moderator-attributed status line
    Notice(String),
    AddNote { content: String, tier: NoteTier },
    /// Synthetic user-role message
    InjectUser(String),
}

impl PlanEffect {
    /// The store command that realizes this effect
    pub fn into_command(self, session_id: SessionId) -> SessionCommand {
        match self {
            PlanEffect::Notice(text) => SessionCommand::Append {
                session_id,
                message: Message::moderator(text),
            },
            PlanEffect::AddNote { content, tier } => SessionCommand::AddContextDoc {
                session_id,
                document: ContextDocument::new(content, tier),
            },
            PlanEffect::InjectUser(text) => SessionCommand::Append {
                session_id,
                message: Message::user(text),
            },
        }
    }
}

/// Everything one reply asks for, with precedence already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    source: DirectiveSource,
    yielded: bool,
    /// At least one roster specialist was granted
    reissue: bool,
    grants: Vec<SpecialistName>,
    revocations: Vec<SpecialistName>,
    effects: Vec<PlanEffect>,
}

impl TurnPlan {
    pub fn build(directives: &[ParsedDirective], source: DirectiveSource) -> Self {
        let yielded = directives
            .iter()
            .any(|d| matches!(d, Ok(Directive::Yield)));

        let mut plan = TurnPlan {
            source,
            yielded,
            reissue: false,
            grants: Vec::new(),
            revocations: Vec::new(),
            effects: Vec::new(),
        };
        let mut yield_noticed = false;

        for directive in directives {
            let directive = match directive {
                Ok(directive) => directive,
                Err(err) => {
                    plan.notice(err.to_string());
                    continue;
                }
            };

            match directive {
                Directive::Team(message) => plan.notice(format!("Team Message: {}", message)),
                Directive::AllowSpeak(RoleRef::Unknown(name))
                | Directive::Deny(RoleRef::Unknown(name)) => {
                    plan.notice(format!("Unknown assistant: {}", name));
                }
                Directive::AllowSpeak(RoleRef::Known(name)) => {
                    if yielded {
                        continue;
                    }
                    plan.reissue = true;
                    plan.revocations.retain(|n| n != name);
                    if !plan.grants.contains(name) {
                        plan.grants.push(name.clone());
                    }
                    plan.notice(format!(
                        "Permission granted for {} to speak.",
                        name.display_name()
                    ));
                }
                Directive::Deny(RoleRef::Known(name)) => {
                    if yielded {
                        continue;
                    }
                    plan.grants.retain(|n| n != name);
                    if !plan.revocations.contains(name) {
                        plan.revocations.push(name.clone());
                    }
                    plan.notice(format!(
                        "Permission denied for {} to speak.",
                        name.display_name()
                    ));
                }
                Directive::Yield => {
                    if !yield_noticed {
                        yield_noticed = true;
                        plan.notice(YIELD_NOTICE.to_string());
                    }
                }
                Directive::Note(text) => {
                    plan.effects.push(PlanEffect::AddNote {
                        content: text.clone(),
                        tier: NoteTier::Session,
                    });
                    plan.notice(SESSION_NOTE_NOTICE.to_string());
                }
                Directive::PermanentNote(text) => {
                    plan.effects.push(PlanEffect::AddNote {
                        content: text.clone(),
                        tier: NoteTier::Permanent,
                    });
                    plan.notice(PERMANENT_NOTE_NOTICE.to_string());
                }
                Directive::User(text) => plan.effects.push(PlanEffect::InjectUser(text.clone())),
                // only meaningful as a whole reply
                Directive::Ok => {}
                Directive::Unknown { command } => {
                    let text = match source {
                        DirectiveSource::Moderator => {
                            format!("Unknown command received from Moderator: {}", command)
                        }
                        DirectiveSource::Operator => format!("Unknown command: {}", command),
                    };
                    plan.notice(text);
                }
            }
        }

        plan
    }

    fn notice(&mut self, text: String) {
        self.effects.push(PlanEffect::Notice(text));
    }

    pub fn source(&self) -> DirectiveSource {
        self.source
    }

    pub fn yielded(&self) -> bool {
        self.yielded
    }

    /// Grants that survived composition, in grant order
    pub fn grants(&self) -> &[SpecialistName] {
        &self.grants
    }

    pub fn revocations(&self) -> &[SpecialistName] {
        &self.revocations
    }

    pub fn effects(&self) -> &[PlanEffect] {
        &self.effects
    }

    /// Specialists to invoke after the plan is applied, in order.
    pub fn dispatches(&self) -> &[SpecialistName] {
        if self.source == DirectiveSource::Moderator && self.reissue && !self.yielded {
            &self.grants
        } else {
            &[]
        }
    }

    /// Store commands for the transcript-visible effects, in textual order.
    pub fn effect_commands(&self, session_id: &SessionId) -> Vec<SessionCommand> {
        self.effects
            .iter()
            .cloned()
            .map(|effect| effect.into_command(session_id.clone()))
            .collect()
    }

    /// Store commands that update the open round.
    pub fn round_commands(&self, session_id: &SessionId) -> Vec<SessionCommand> {
        let session_id = session_id.clone();

        if self.yielded {
            return vec![SessionCommand::ResetRound { session_id }];
        }

        if self.source == DirectiveSource::Moderator && self.reissue {
            return vec![SessionCommand::ReissueGrants {
                session_id,
                names: self.grants.clone(),
            }];
        }

        let grants = self.grants.iter().map(|name| SessionCommand::Grant {
            session_id: session_id.clone(),
            name: name.clone(),
        });
        let revokes = self.revocations.iter().map(|name| SessionCommand::Revoke {
            session_id: session_id.clone(),
            name: name.clone(),
        });
        grants.chain(revokes).collect()
    }
}
