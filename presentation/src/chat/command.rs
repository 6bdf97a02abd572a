//! REPL input parsing

use roundtable_domain::{SessionId, SessionStore};
use std::path::PathBuf;
use thiserror::Error;

/// A slash command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Sessions,
    New(Option<String>),
    Switch(String),
    Delete(String),
    Rename(String),
    Attach(PathBuf),
    History,
    /// 1-based message number, as shown by `/history`
    Edit { index: usize, text: String },
    Retract(usize),
    Clear,
    Status,
    Start,
    Quit,
}

/// One line of REPL input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Command(ReplCommand),
    /// `!command` lines applied on the operator's authority
    Operator(String),
    /// Anything else starts a round
    Message(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplParseError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a message number: {0}")]
    InvalidIndex(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Result<Self, ReplParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ReplInput::Empty);
        }
        if line.starts_with('!') {
            return Ok(ReplInput::Operator(line.to_string()));
        }
        if line.starts_with('/') {
            return ReplCommand::parse(line).map(ReplInput::Command);
        }
        Ok(ReplInput::Message(line.to_string()))
    }
}

impl ReplCommand {
    fn parse(line: &str) -> Result<Self, ReplParseError> {
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name {
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/sessions" | "/ls" => ReplCommand::Sessions,
            "/new" => ReplCommand::New((!rest.is_empty()).then(|| rest.to_string())),
            "/switch" => ReplCommand::Switch(required(rest, "/switch <session>")?.to_string()),
            "/delete" => ReplCommand::Delete(required(rest, "/delete <session>")?.to_string()),
            "/rename" => ReplCommand::Rename(required(rest, "/rename <title>")?.to_string()),
            "/attach" => ReplCommand::Attach(PathBuf::from(required(rest, "/attach <path>")?)),
            "/history" => ReplCommand::History,
            "/edit" => {
                let args = required(rest, "/edit <n> <text>")?;
                let (index, text) = args
                    .split_once(char::is_whitespace)
                    .ok_or(ReplParseError::Usage("/edit <n> <text>"))?;
                ReplCommand::Edit {
                    index: message_index(index)?,
                    text: text.trim().to_string(),
                }
            }
            "/retract" => ReplCommand::Retract(message_index(required(rest, "/retract <n>")?)?),
            "/clear" => ReplCommand::Clear,
            "/status" => ReplCommand::Status,
            "/start" => ReplCommand::Start,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            other => return Err(ReplParseError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn required<'a>(rest: &'a str, usage: &'static str) -> Result<&'a str, ReplParseError> {
    if rest.is_empty() {
        Err(ReplParseError::Usage(usage))
    } else {
        Ok(rest)
    }
}

fn message_index(raw: &str) -> Result<usize, ReplParseError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ReplParseError::InvalidIndex(raw.to_string())),
    }
}

/// Find a session by list number (as printed by `/sessions`), full id, or
/// unique id prefix.
pub fn resolve_session_id(store: &SessionStore, needle: &str) -> Option<SessionId> {
    let needle = needle.trim();
    let sessions = store.sessions();

    if let Ok(n) = needle.parse::<usize>()
        && n > 0
        && let Some(session) = sessions.get(n - 1)
    {
        return Some(session.id().clone());
    }

    let mut matches = sessions
        .iter()
        .filter(|s| s.id().as_str().starts_with(needle));
    match (matches.next(), matches.next()) {
        (Some(session), None) => Some(session.id().clone()),
        _ => None,
    }
}
