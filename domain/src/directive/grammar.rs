//! Directive grammar
//!
//! | Command | Argument | Directive |
//! |---------|----------|-----------|
//! | `!team` | message | [`Directive::Team`] |
//! | `!allowspeak` | role name | [`Directive::AllowSpeak`] |
//! | `!deny` | role name | [`Directive::Deny`] |
//! | `!yield` | - | [`Directive::Yield`] |
//! | `!note` | text | [`Directive::Note`] |
//! | `!permanentnote` | text | [`Directive::PermanentNote`] |
//! | `!user` | text | [`Directive::User`] |
//! | `!ok` | - | [`Directive::Ok`] |
//!
//! Command tokens are case-insensitive. Anything else starting with `!` is
//! [`Directive::Unknown`]; a known command missing its argument is a
//! [`DomainError::MalformedDirective`].

use super::tokenizer::{strip_code_fences, tokenize_line, unbrace};
use crate::core::error::DomainError;
use crate::roster::{RoleRef, Roster};

/// A parsed instruction from one `!command` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Team(String),
    AllowSpeak(RoleRef),
    Deny(RoleRef),
    Yield,
    Note(String),
    PermanentNote(String),
    User(String),
    Ok,
    Unknown { command: String },
}

impl Directive {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Directive::Team(_) => "team",
            Directive::AllowSpeak(_) => "allowspeak",
            Directive::Deny(_) => "deny",
            Directive::Yield => "yield",
            Directive::Note(_) => "note",
            Directive::PermanentNote(_) => "permanentnote",
            Directive::User(_) => "user",
            Directive::Ok => "ok",
            Directive::Unknown { .. } => "unknown",
        }
    }
}

/// Result of parsing one command line
pub type ParsedDirective = Result<Directive, DomainError>;

/// Parses moderator or operator text into directives, resolving role
/// arguments against the roster.
pub struct DirectiveParser<'r> {
    roster: &'r Roster,
}

impl<'r> DirectiveParser<'r> {
    pub fn new(roster: &'r Roster) -> Self {
        Self { roster }
    }

    /// Parse every command line of `text`, in order. Non-command lines are
    /// skipped; code fences are stripped first.
    pub fn parse(&self, text: &str) -> Vec<ParsedDirective> {
        strip_code_fences(text)
            .lines()
            .filter_map(|line| self.parse_line(line))
            .collect()
    }

    /// Parse a single line; `None` when it is not a command.
    pub fn parse_line(&self, line: &str) -> Option<ParsedDirective> {
        let line = tokenize_line(line)?;
        let text = unbrace(line.argument);

        let parsed = match line.command.as_str() {
            "team" => free_text(text, "team", "!team {message}").map(Directive::Team),
            "allowspeak" => self
                .role_argument(text, "allowspeak", "!allowspeak {assistant}")
                .map(Directive::AllowSpeak),
            "deny" => self
                .role_argument(text, "deny", "!deny {assistant}")
                .map(Directive::Deny),
            "yield" => Ok(Directive::Yield),
            "note" => free_text(text, "note", "!note {note}").map(Directive::Note),
            "permanentnote" => free_text(text, "permanentnote", "!permanentnote {note}")
                .map(Directive::PermanentNote),
            "user" => free_text(text, "user", "!user {message}").map(Directive::User),
            "ok" => Ok(Directive::Ok),
            _ => Ok(Directive::Unknown {
                command: line.raw_command.to_string(),
            }),
        };
        Some(parsed)
    }

    /// Resolve a role argument. The whole argument is tried first so that
    /// multi-word names work unbraced; then just its first word, which
    /// tolerates trailing chatter (`!allowspeak planner please`).
    fn role_argument(
        &self,
        text: &str,
        command: &str,
        usage: &str,
    ) -> Result<RoleRef, DomainError> {
        if text.is_empty() {
            return Err(malformed(command, "missing role name", usage));
        }

        let whole = self.roster.resolve(text);
        if whole.known().is_some() {
            return Ok(whole);
        }

        match text.split_whitespace().next().map(|w| self.roster.resolve(w)) {
            Some(first @ RoleRef::Known(_)) => Ok(first),
            _ => Ok(whole),
        }
    }
}

fn free_text(text: &str, command: &str, usage: &str) -> Result<String, DomainError> {
    if text.is_empty() {
        Err(malformed(command, "missing text", usage))
    } else {
        Ok(text.to_string())
    }
}

fn malformed(command: &str, reason: &str, usage: &str) -> DomainError {
    DomainError::MalformedDirective {
        command: command.to_string(),
        reason: format!("{} (usage: {})", reason, usage),
    }
}

/// True when a reply is exactly the `!OK` readiness sentinel.
pub fn is_ready_sentinel(text: &str) -> bool {
    strip_code_fences(text).eq_ignore_ascii_case("!ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<ParsedDirective> {
        let roster = Roster::default();
        DirectiveParser::new(&roster).parse(text)
    }

    fn known(name: &str) -> RoleRef {
        Roster::default().resolve(name)
    }

    #[test]
    fn test_parses_in_order_and_skips_prose() {
        let directives = parse(
            "Sure, let me organize this.\n!team {Researcher, gather data.}\n!allowspeak Researcher\n!allowspeak {Planner}\n",
        );
        assert_eq!(
            directives,
            vec![
                Ok(Directive::Team("Researcher, gather data.".to_string())),
                Ok(Directive::AllowSpeak(known("researcher"))),
                Ok(Directive::AllowSpeak(known("planner"))),
            ]
        );
    }

    #[test]
    fn test_command_tokens_are_case_insensitive() {
        let directives = parse("!YIELD\n!Ok\n!DeNy mike");
        assert_eq!(
            directives,
            vec![
                Ok(Directive::Yield),
                Ok(Directive::Ok),
                Ok(Directive::Deny(known("mike"))),
            ]
        );
    }

    #[test]
    fn test_multi_word_and_chatty_role_arguments() {
        assert_eq!(
            parse("!allowspeak software engineer"),
            vec![Ok(Directive::AllowSpeak(known("software-engineer")))]
        );
        assert_eq!(
            parse("!allowspeak planner, go ahead"),
            vec![Ok(Directive::AllowSpeak(known("planner")))]
        );
    }

    #[test]
    fn test_unknown_role_is_explicit() {
        assert_eq!(
            parse("!allowspeak {Gardener}"),
            vec![Ok(Directive::AllowSpeak(RoleRef::Unknown(
                "gardener".to_string()
            )))]
        );
    }

    #[test]
    fn test_missing_arguments_are_malformed() {
        let directives = parse("!allowspeak\n!note {}\n!user");
        assert_eq!(directives.len(), 3);
        for directive in &directives {
            assert!(matches!(
                directive,
                Err(DomainError::MalformedDirective { .. })
            ));
        }
        let Err(DomainError::MalformedDirective { command, reason }) = &directives[0] else {
            panic!("expected malformed directive");
        };
        assert_eq!(command, "allowspeak");
        assert!(reason.contains("!allowspeak {assistant}"));
    }

    #[test]
    fn test_unknown_command_keeps_raw_token() {
        assert_eq!(
            parse("!frobnicate x"),
            vec![Ok(Directive::Unknown {
                command: "!frobnicate".to_string()
            })]
        );
    }

    #[test]
    fn test_notes_and_user_injection() {
        let directives = parse("!note {budget is 10k}\n!permanentnote deadline friday\n!user {I meant Q3}");
        assert_eq!(
            directives,
            vec![
                Ok(Directive::Note("budget is 10k".to_string())),
                Ok(Directive::PermanentNote("deadline friday".to_string())),
                Ok(Directive::User("I meant Q3".to_string())),
            ]
        );
    }

    #[test]
    fn test_fenced_reply() {
        let directives = parse("```\n!allowspeak mike\n!yield\n```");
        assert_eq!(
            directives,
            vec![Ok(Directive::AllowSpeak(known("mike"))), Ok(Directive::Yield)]
        );
    }

    #[test]
    fn test_ready_sentinel() {
        assert!(is_ready_sentinel("!OK"));
        assert!(is_ready_sentinel("```\n!ok\n```"));
        assert!(!is_ready_sentinel("!OK\n!allowspeak planner"));
        assert!(!is_ready_sentinel("OK"));
    }
}
