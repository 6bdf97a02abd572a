//! Console output for the panel transcript

use chrono::Local;
use colored::{ColoredString, Colorize};
use roundtable_domain::{
    ChatSession, Message, Role, Roster, RoundOutcome, SessionStore, TurnResult,
};

/// Formats sessions and messages for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn role_label(role: &Role) -> ColoredString {
        let label = role.label();
        match role {
            Role::User => label.green().bold(),
            Role::Moderator => label.magenta().bold(),
            Role::Context => label.dimmed(),
            Role::Assistant(_) => label.yellow().bold(),
        }
    }

    /// One message: label, local time, then the content
    pub fn format_message(message: &Message) -> String {
        let time = message.timestamp.with_timezone(&Local).format("%H:%M");
        format!(
            "{} {}\n{}\n",
            Self::role_label(&message.role),
            format!("[{}]", time).dimmed(),
            message.content
        )
    }

    /// Numbered transcript, as referenced by `/edit` and `/retract`
    pub fn format_history(session: &ChatSession) -> String {
        if session.messages().is_empty() {
            return format!("{}\n", "(no messages yet)".dimmed());
        }

        let mut output = Self::section_header(session.title());
        for (i, message) in session.messages().iter().enumerate() {
            output.push_str(&format!(
                "{} {}",
                format!("{:>3}.", i + 1).cyan(),
                Self::format_message(message)
            ));
        }
        output
    }

    pub fn format_session_list(store: &SessionStore) -> String {
        let mut output = Self::section_header("Sessions");
        for (i, session) in store.sessions().iter().enumerate() {
            let marker = if store.active_id() == Some(session.id()) {
                "*".green().bold()
            } else {
                " ".normal()
            };
            output.push_str(&format!(
                "{} {:>2}. {} {} {}\n",
                marker,
                i + 1,
                session.id().short().dimmed(),
                session.title(),
                format!("({} messages)", session.messages().len()).dimmed()
            ));
        }
        output
    }

    pub fn format_status(session: &ChatSession, roster: &Roster, busy: bool) -> String {
        let names = |list: &[roundtable_domain::SpecialistName]| {
            if list.is_empty() {
                "-".to_string()
            } else {
                list.iter()
                    .map(|n| n.display_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };

        let mut output = Self::section_header(session.title());
        output.push_str(&format!("{} {}\n", "Session:".cyan().bold(), session.id()));
        output.push_str(&format!(
            "{} {}\n",
            "Round:".cyan().bold(),
            session.conversation_round()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Allowed:".cyan().bold(),
            names(session.allowed_assistants())
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Responded:".cyan().bold(),
            names(session.responded_assistants())
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Context documents:".cyan().bold(),
            session.context_docs().len()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Team:".cyan().bold(),
            roster
                .specialists()
                .iter()
                .map(|s| s.name.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        if busy {
            output.push_str(&format!("{}\n", "A round is in progress.".yellow()));
        }
        output
    }

    /// One-line summary of failures and interruptions, if any
    pub fn format_outcome(outcome: &RoundOutcome) -> Option<String> {
        if outcome.cancelled {
            return Some(format!("{}", "Round cancelled.".yellow()));
        }
        if outcome.moderator_failed {
            return Some(format!("{}", "The moderator could not be reached.".red()));
        }

        let failed: Vec<String> = outcome
            .turns
            .iter()
            .filter_map(|(name, result)| match result {
                TurnResult::Failed(reason) => {
                    Some(format!("{} ({})", name.display_name(), reason))
                }
                TurnResult::Responded => None,
            })
            .collect();
        if failed.is_empty() {
            None
        } else {
            Some(format!(
                "{} {}",
                "Did not respond:".red().bold(),
                failed.join(", ")
            ))
        }
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{SessionCommand, SessionId};

    fn planner() -> roundtable_domain::SpecialistName {
        Roster::default().resolve("planner").known().cloned().unwrap()
    }

    #[test]
    fn test_format_message_labels_roles() {
        let text = ConsoleFormatter::format_message(&Message::assistant(planner(), "Phase one."));
        assert!(text.contains("Assistant (Planner)"));
        assert!(text.contains("Phase one."));

        let text = ConsoleFormatter::format_message(&Message::moderator("!yield"));
        assert!(text.contains("Moderator"));
    }

    #[test]
    fn test_history_is_numbered() {
        let session = ChatSession::with_id(SessionId::from("s1"), "Launch");
        let store = SessionStore::default()
            .apply(SessionCommand::CreateSession(session))
            .unwrap()
            .apply(SessionCommand::Append {
                session_id: SessionId::from("s1"),
                message: Message::user("first"),
            })
            .unwrap()
            .apply(SessionCommand::Append {
                session_id: SessionId::from("s1"),
                message: Message::user("second"),
            })
            .unwrap();

        let text = ConsoleFormatter::format_history(store.get(&SessionId::from("s1")).unwrap());
        assert!(text.contains("1."));
        assert!(text.contains("2."));
        assert!(text.contains("second"));

        let list = ConsoleFormatter::format_session_list(&store);
        assert!(list.contains("Launch"));
        assert!(list.contains("(2 messages)"));
    }

    #[test]
    fn test_outcome_summary() {
        assert_eq!(ConsoleFormatter::format_outcome(&RoundOutcome::default()), None);

        let outcome = RoundOutcome {
            turns: vec![(planner(), TurnResult::Failed("Timed out after 5s".into()))],
            ..Default::default()
        };
        let text = ConsoleFormatter::format_outcome(&outcome).unwrap();
        assert!(text.contains("Planner (Timed out after 5s)"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
