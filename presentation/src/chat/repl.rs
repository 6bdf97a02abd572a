//! REPL (Read-Eval-Print Loop) for the panel chat

use crate::chat::command::{ReplCommand, ReplInput, resolve_session_id};
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::{ProgressReporter, SimpleProgress};
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use roundtable_application::{
    AttachDocumentUseCase, LlmGateway, NoRoundProgress, RoundProgressNotifier, RunRoundError,
    RunRoundInput, RunRoundUseCase, SessionService, SessionServiceError,
};
use roundtable_domain::{MessageId, Roster, RoundOutcome, SessionCommand, SessionId};
use std::fmt::Display;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const HISTORY_CAPACITY: usize = 1000;

/// Interactive panel REPL
pub struct ChatRepl<G: LlmGateway + 'static> {
    rounds: RunRoundUseCase<G>,
    attach: AttachDocumentUseCase,
    sessions: Arc<SessionService>,
    roster: Arc<Roster>,
    config: ReplConfig,
}

impl<G: LlmGateway + 'static> ChatRepl<G> {
    pub fn new(rounds: RunRoundUseCase<G>, attach: AttachDocumentUseCase, roster: Arc<Roster>) -> Self {
        let sessions = rounds.sessions().clone();
        Self {
            rounds,
            attach,
            sessions,
            roster,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL until `/quit` or Ctrl-D
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = Reedline::create();
        if let Some(path) = self.config.history_path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_CAPACITY, path) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => warn!("History disabled: {}", e),
            }
        }
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("roundtable".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => match ReplInput::parse(&line) {
                    Ok(ReplInput::Empty) => continue,
                    Ok(ReplInput::Command(command)) => {
                        if self.handle_command(command).await {
                            break;
                        }
                    }
                    Ok(ReplInput::Operator(text)) => self.operator_command(&text),
                    Ok(ReplInput::Message(text)) => self.send(&text).await,
                    Err(e) => {
                        report(e);
                        println!("Type /help for available commands");
                    }
                },
                Ok(Signal::CtrlC) => {
                    println!("^C");
                    continue;
                }
                Ok(Signal::CtrlD) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Attach documents to the active session
    pub fn attach_all(&self, paths: &[PathBuf]) {
        for path in paths {
            self.attach_document(path);
        }
    }

    /// Brief the moderator on the active session (the `/start` command)
    pub async fn start_active(&self) {
        let id = match self.current_session() {
            Ok(id) => id,
            Err(e) => return report(e),
        };
        let before = self.message_count(&id);

        let token = CancellationToken::new();
        let watcher = cancel_on_ctrl_c(token.clone());
        let progress = self.progress();
        let result = self
            .rounds
            .start_session(&id, Some(&token), progress.as_ref())
            .await;
        watcher.abort();

        self.finish_round(&id, before, result);
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            Roundtable - Panel Chat          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Team: {}",
            self.roster
                .specialists()
                .iter()
                .map(|s| s.name.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        if let Some(session) = self.sessions.snapshot().active() {
            println!(
                "Session: {} ({} messages)",
                session.title(),
                session.messages().len()
            );
        }
        println!();
        println!("Type a message to ask the panel, or /help for commands.");
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?        - Show this help");
        println!("  /sessions, /ls       - List sessions");
        println!("  /new [title]         - Start a new session");
        println!("  /switch <session>    - Switch to a session (number or id)");
        println!("  /delete <session>    - Delete a session");
        println!("  /rename <title>      - Rename the current session");
        println!("  /attach <path>       - Attach a text document");
        println!("  /history             - Show the numbered transcript");
        println!("  /edit <n> <text>     - Replace the text of message n");
        println!("  /retract <n>         - Remove message n and everything after it");
        println!("  /clear               - Clear the transcript");
        println!("  /status              - Show round and grant state");
        println!("  /start               - Ask the moderator to open the session");
        println!("  /quit, /exit, /q     - Exit");
        println!();
        println!("Lines starting with ! are applied as moderator commands:");
        println!("  !allowspeak <name>  !deny <name>  !yield  !note <text>");
        println!("  !permanentnote <text>  !team <text>  !user <text>");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => self.print_help(),
            ReplCommand::Sessions => {
                println!("{}", ConsoleFormatter::format_session_list(&self.sessions.snapshot()));
            }
            ReplCommand::New(title) => {
                match self.sessions.create_session(title.as_deref().unwrap_or_default()) {
                    Ok(id) => {
                        println!("Started session {}", id.short());
                        println!("Type /start to have the moderator open it.");
                    }
                    Err(e) => report(e),
                }
            }
            ReplCommand::Switch(needle) => {
                let Some(id) = self.find_session(&needle) else {
                    return false;
                };
                match self.sessions.apply(SessionCommand::SwitchActive(id.clone())) {
                    Ok(()) => self.print_history(&id),
                    Err(e) => report(e),
                }
            }
            ReplCommand::Delete(needle) => {
                let Some(id) = self.find_session(&needle) else {
                    return false;
                };
                match self.sessions.apply(SessionCommand::DeleteSession(id.clone())) {
                    Ok(()) => println!("Deleted session {}", id.short()),
                    Err(e) => report(e),
                }
            }
            ReplCommand::Rename(title) => {
                let result = self.current_session().and_then(|id| {
                    self.sessions.apply(SessionCommand::RenameSession {
                        session_id: id,
                        title,
                    })
                });
                if let Err(e) = result {
                    report(e);
                }
            }
            ReplCommand::Attach(path) => self.attach_document(&path),
            ReplCommand::History => match self.current_session() {
                Ok(id) => self.print_history(&id),
                Err(e) => report(e),
            },
            ReplCommand::Edit { index, text } => {
                let Some((id, message_id)) = self.message_at(index) else {
                    return false;
                };
                match self.sessions.apply(SessionCommand::UpdateMessage {
                    session_id: id,
                    message_id,
                    content: text,
                }) {
                    Ok(()) => println!("Message {} updated.", index),
                    Err(e) => report(e),
                }
            }
            ReplCommand::Retract(index) => {
                let Some((id, message_id)) = self.message_at(index) else {
                    return false;
                };
                match self.sessions.apply(SessionCommand::DeleteFromOnward {
                    session_id: id,
                    message_id,
                }) {
                    Ok(()) => println!("Removed message {} and everything after it.", index),
                    Err(e) => report(e),
                }
            }
            ReplCommand::Clear => {
                let policy = self.rounds.config().note_policy;
                let result = self.current_session().and_then(|id| {
                    self.sessions.apply(SessionCommand::ClearMessages {
                        session_id: id,
                        policy,
                    })
                });
                match result {
                    Ok(()) => println!("Transcript cleared."),
                    Err(e) => report(e),
                }
            }
            ReplCommand::Status => match self.current_session() {
                Ok(id) => {
                    if let Some(session) = self.sessions.session(&id) {
                        let busy = self.sessions.is_busy(&id);
                        println!(
                            "{}",
                            ConsoleFormatter::format_status(&session, &self.roster, busy)
                        );
                    }
                }
                Err(e) => report(e),
            },
            ReplCommand::Start => self.start_active().await,
        }
        false
    }

    async fn send(&self, text: &str) {
        let id = match self.current_session() {
            Ok(id) => id,
            Err(e) => return report(e),
        };
        // the user's own line is already on screen
        let before = self.message_count(&id) + 1;
        println!();

        let token = CancellationToken::new();
        let watcher = cancel_on_ctrl_c(token.clone());
        let input = RunRoundInput::new(id.clone(), text).with_cancellation(token);
        let progress = self.progress();
        let result = self
            .rounds
            .execute_with_progress(input, progress.as_ref())
            .await;
        watcher.abort();

        self.finish_round(&id, before, result);
    }

    fn operator_command(&self, text: &str) {
        let id = match self.current_session() {
            Ok(id) => id,
            Err(e) => return report(e),
        };
        let before = self.message_count(&id);

        match self.rounds.apply_operator_command(&id, text) {
            Ok(_) => self.print_since(&id, before),
            Err(e) => report(e),
        }
    }

    fn finish_round(
        &self,
        id: &SessionId,
        before: usize,
        result: Result<RoundOutcome, RunRoundError>,
    ) {
        match result {
            Ok(outcome) => {
                self.print_since(id, before);
                if let Some(summary) = ConsoleFormatter::format_outcome(&outcome) {
                    println!("{}", summary);
                    println!();
                }
            }
            Err(e) if e.is_busy() => {
                println!("{}", "A round is already running in this session.".yellow());
            }
            Err(e) => report(e),
        }
    }

    fn attach_document(&self, path: &Path) {
        let id = match self.current_session() {
            Ok(id) => id,
            Err(e) => return report(e),
        };
        let before = self.message_count(&id);
        let result = self.attach.execute(&id, path);
        self.print_since(&id, before);
        match result {
            Ok(bytes) => println!("{} ({} bytes)", path.display(), bytes),
            Err(e) => report(e),
        }
    }

    fn progress(&self) -> Box<dyn RoundProgressNotifier> {
        if !self.config.show_progress {
            Box::new(NoRoundProgress)
        } else if std::io::stdout().is_terminal() {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        }
    }

    /// The active session, creating one when every session was deleted
    fn current_session(&self) -> Result<SessionId, SessionServiceError> {
        match self.sessions.active_id() {
            Some(id) => Ok(id),
            None => self.sessions.create_session(""),
        }
    }

    fn find_session(&self, needle: &str) -> Option<SessionId> {
        let id = resolve_session_id(&self.sessions.snapshot(), needle);
        if id.is_none() {
            report(format!("No session matches '{}'", needle));
        }
        id
    }

    /// Session id and message id for a 1-based `/history` number
    fn message_at(&self, index: usize) -> Option<(SessionId, MessageId)> {
        let found = self.sessions.active_id().and_then(|id| {
            let message_id = self.sessions.session(&id)?.messages().get(index - 1)?.id.clone();
            Some((id, message_id))
        });
        if found.is_none() {
            report(format!("No message #{} in this session", index));
        }
        found
    }

    fn message_count(&self, id: &SessionId) -> usize {
        self.sessions
            .session(id)
            .map(|s| s.messages().len())
            .unwrap_or(0)
    }

    fn print_since(&self, id: &SessionId, from: usize) {
        if let Some(session) = self.sessions.session(id) {
            for message in session.messages().iter().skip(from) {
                println!("{}", ConsoleFormatter::format_message(message));
            }
        }
    }

    fn print_history(&self, id: &SessionId) {
        if let Some(session) = self.sessions.session(id) {
            println!("{}", ConsoleFormatter::format_history(&session));
        }
    }
}

/// Cancel `token` on Ctrl-C while a round is in flight
fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

fn report(err: impl Display) {
    eprintln!("{} {}", "Error:".red().bold(), err);
}
