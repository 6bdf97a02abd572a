//! Run Round use case
//!
//! The turn dispatcher. One round:
//!
//! 1. append the user's message (`AwaitingUser` → `Moderating`)
//! 2. ask the moderator, append its reply
//! 3. parse the reply into a [`TurnPlan`] and apply its effects
//! 4. invoke each granted specialist in grant order (`Dispatching`)
//! 5. back to `AwaitingUser`
//!
//! Gateway failures never escape: a moderator failure becomes a notice and
//! ends the round (`ErrorRecovery`), a specialist failure becomes a notice and
//! the next specialist is asked. Only session store and storage errors are
//! returned to the caller.

use crate::config::BehaviorConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::{NoRoundProgress, RoundProgressNotifier};
use crate::use_cases::session_service::{SessionService, SessionServiceError};
use roundtable_domain::util::preview;
use roundtable_domain::{
    DirectiveParser, DirectiveSource, Message, Role, Roster, RoundOutcome, RoundState,
    SESSION_READY_NOTICE, SessionCommand, SessionId, SpecialistName, TranscriptEntry, TurnPlan,
    TurnResult, is_ready_sentinel,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Notice appended when the moderator cannot be reached
pub const MODERATOR_ERROR_NOTICE: &str = "There was an error processing your request.";
/// Notice appended when a round is interrupted
pub const CANCELLED_NOTICE: &str = "Round cancelled. Control is back with the user.";

const PREVIEW_BYTES: usize = 200;

/// Errors that can occur while running a round
#[derive(Error, Debug)]
pub enum RunRoundError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Not an operator command (must start with '!')")]
    NotACommand,

    #[error(transparent)]
    Session(#[from] SessionServiceError),
}

impl RunRoundError {
    pub fn is_busy(&self) -> bool {
        matches!(self, RunRoundError::Session(e) if e.is_busy())
    }
}

/// Input for the RunRound use case
#[derive(Debug, Clone)]
pub struct RunRoundInput {
    pub session_id: SessionId,
    pub content: String,
    pub cancellation: Option<CancellationToken>,
}

impl RunRoundInput {
    pub fn new(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            session_id,
            content: content.into(),
            cancellation: None,
        }
    }

    /// Set a cancellation token for interrupting the round
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// What an operator command changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorOutcome {
    /// Number of directives parsed from the input
    pub directives: usize,
    pub yielded: bool,
}

/// Use case for running moderated rounds
pub struct RunRoundUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    sessions: Arc<SessionService>,
    roster: Arc<Roster>,
    config: BehaviorConfig,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<G: LlmGateway + 'static> RunRoundUseCase<G> {
    pub fn new(gateway: Arc<G>, sessions: Arc<SessionService>, roster: Arc<Roster>) -> Self {
        Self {
            gateway,
            sessions,
            roster,
            config: BehaviorConfig::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_config(mut self, config: BehaviorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a conversation logger for structured event recording
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionService> {
        &self.sessions
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    /// Execute a round with default (no-op) progress
    pub async fn execute(&self, input: RunRoundInput) -> Result<RoundOutcome, RunRoundError> {
        self.execute_with_progress(input, &NoRoundProgress).await
    }

    /// Submit a user message and run the round it starts.
    pub async fn execute_with_progress(
        &self,
        input: RunRoundInput,
        progress: &dyn RoundProgressNotifier,
    ) -> Result<RoundOutcome, RunRoundError> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(RunRoundError::EmptyMessage);
        }

        let _busy = self.sessions.begin_round(&input.session_id)?;
        info!("Round started in session {}", input.session_id.short());

        self.sessions.apply(SessionCommand::Append {
            session_id: input.session_id.clone(),
            message: Message::user(content),
        })?;
        self.conversation_logger.log(ConversationEvent::new(
            "user_message",
            json!({
                "session_id": input.session_id.as_str(),
                "content": content,
            }),
        ));

        self.run_moderated(&input.session_id, input.cancellation.as_ref(), progress)
            .await
    }

    /// Kick off a fresh session: ask the moderator with the transcript as it
    /// is. A moderator that answers `!OK` gets the "session started" notice.
    pub async fn start_session(
        &self,
        session_id: &SessionId,
        cancellation: Option<&CancellationToken>,
        progress: &dyn RoundProgressNotifier,
    ) -> Result<RoundOutcome, RunRoundError> {
        let _busy = self.sessions.begin_round(session_id)?;
        info!("Starting session {}", session_id.short());
        self.run_moderated(session_id, cancellation, progress).await
    }

    /// Apply `!command` lines typed by the operator.
    ///
    /// Uses the moderator's grammar but never calls the gateway: grants and
    /// denies edit the open round, and nothing is dispatched.
    pub fn apply_operator_command(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<OperatorOutcome, RunRoundError> {
        let text = text.trim();
        if !text.starts_with('!') {
            return Err(RunRoundError::NotACommand);
        }

        let _busy = self.sessions.begin_round(session_id)?;
        let directives = DirectiveParser::new(&self.roster).parse(text);
        let plan = TurnPlan::build(&directives, DirectiveSource::Operator);
        self.log_plan(session_id, DirectiveSource::Operator, &directives, &plan);

        self.sessions.apply_all(
            plan.effect_commands(session_id)
                .into_iter()
                .chain(plan.round_commands(session_id)),
        )?;
        debug!("Operator applied {} directive(s)", directives.len());

        Ok(OperatorOutcome {
            directives: directives.len(),
            yielded: plan.yielded(),
        })
    }

    async fn run_moderated(
        &self,
        session_id: &SessionId,
        cancellation: Option<&CancellationToken>,
        progress: &dyn RoundProgressNotifier,
    ) -> Result<RoundOutcome, RunRoundError> {
        let mut outcome = RoundOutcome::default();
        progress.on_state_change(session_id, &RoundState::Moderating);

        // Moderator
        let transcript = self.transcript(session_id)?;
        let reply = match self
            .invoke(&Role::Moderator, &transcript, cancellation)
            .await
        {
            Ok(reply) => reply,
            Err(GatewayError::Cancelled) => {
                self.notice(session_id, CANCELLED_NOTICE)?;
                outcome.cancelled = true;
                return Ok(self.finish(session_id, outcome, progress));
            }
            Err(e) => {
                warn!("Moderator failed: {}", e);
                progress.on_state_change(session_id, &RoundState::ErrorRecovery);
                self.notice(session_id, &format!("{} ({})", MODERATOR_ERROR_NOTICE, e))?;
                outcome.moderator_failed = true;
                return Ok(self.finish(session_id, outcome, progress));
            }
        };

        if is_ready_sentinel(&reply) {
            info!("Moderator signalled ready");
            self.notice(session_id, SESSION_READY_NOTICE)?;
            outcome.session_ready = true;
            return Ok(self.finish(session_id, outcome, progress));
        }

        self.sessions.apply(SessionCommand::Append {
            session_id: session_id.clone(),
            message: Message::moderator(reply.trim()),
        })?;

        // Directives
        let directives = DirectiveParser::new(&self.roster).parse(&reply);
        let plan = TurnPlan::build(&directives, DirectiveSource::Moderator);
        self.log_plan(session_id, DirectiveSource::Moderator, &directives, &plan);

        self.sessions.apply_all(
            plan.effect_commands(session_id)
                .into_iter()
                .chain(plan.round_commands(session_id)),
        )?;
        outcome.yielded = plan.yielded();

        if plan.yielded() {
            info!("Moderator yielded");
            return Ok(self.finish(session_id, outcome, progress));
        }

        // Dispatch
        for name in plan.dispatches() {
            progress.on_state_change(session_id, &RoundState::Dispatching(name.clone()));
            let transcript = self.transcript(session_id)?;

            match self
                .invoke(&Role::Assistant(name.clone()), &transcript, cancellation)
                .await
            {
                Ok(text) => {
                    self.sessions.apply_all([
                        SessionCommand::Append {
                            session_id: session_id.clone(),
                            message: Message::assistant(name.clone(), text.trim()),
                        },
                        SessionCommand::MarkResponded {
                            session_id: session_id.clone(),
                            name: name.clone(),
                        },
                    ])?;
                    progress.on_turn_complete(name, true);
                    outcome.turns.push((name.clone(), TurnResult::Responded));
                }
                Err(GatewayError::Cancelled) => {
                    self.notice(session_id, CANCELLED_NOTICE)?;
                    outcome.cancelled = true;
                    break;
                }
                Err(e) => {
                    warn!("{} failed: {}", name, e);
                    self.notice(session_id, &specialist_error_notice(name, &e))?;
                    progress.on_turn_complete(name, false);
                    outcome.turns.push((name.clone(), TurnResult::Failed(e.to_string())));
                }
            }
        }

        if !plan.dispatches().is_empty() {
            self.sessions.apply(SessionCommand::IncrementRound {
                session_id: session_id.clone(),
            })?;
        }

        Ok(self.finish(session_id, outcome, progress))
    }

    fn transcript(&self, session_id: &SessionId) -> Result<Vec<TranscriptEntry>, RunRoundError> {
        self.sessions
            .session(session_id)
            .map(|session| session.transcript())
            .ok_or_else(|| {
                SessionServiceError::Domain(roundtable_domain::DomainError::UnknownSession(
                    session_id.clone(),
                ))
                .into()
            })
    }

    fn notice(&self, session_id: &SessionId, text: &str) -> Result<(), RunRoundError> {
        self.sessions.apply(SessionCommand::Append {
            session_id: session_id.clone(),
            message: Message::moderator(text),
        })?;
        Ok(())
    }

    fn finish(
        &self,
        session_id: &SessionId,
        outcome: RoundOutcome,
        progress: &dyn RoundProgressNotifier,
    ) -> RoundOutcome {
        progress.on_state_change(session_id, &RoundState::AwaitingUser);
        progress.on_round_complete(session_id, &outcome);
        self.conversation_logger.log(ConversationEvent::new(
            "round_complete",
            json!({
                "session_id": session_id.as_str(),
                "moderator_failed": outcome.moderator_failed,
                "session_ready": outcome.session_ready,
                "yielded": outcome.yielded,
                "cancelled": outcome.cancelled,
                "responded": outcome.responded().map(|n| n.as_str()).collect::<Vec<_>>(),
                "failures": outcome.failures(),
            }),
        ));
        info!(
            "Round finished: {} turn(s), {} failure(s)",
            outcome.turns.len(),
            outcome.failures()
        );
        outcome
    }

    /// One gateway call, bounded by the configured timeout and the
    /// cancellation token.
    async fn invoke(
        &self,
        role: &Role,
        transcript: &[TranscriptEntry],
        cancellation: Option<&CancellationToken>,
    ) -> Result<String, GatewayError> {
        debug!("Invoking {} with {} entries", role, transcript.len());
        self.conversation_logger.log(ConversationEvent::new(
            "gateway_request",
            json!({
                "role": role.wire_name(),
                "entries": transcript.len(),
            }),
        ));

        let call = async {
            let request = self.gateway.invoke(role, transcript);
            match self.config.timeout {
                Some(timeout) => match tokio::time::timeout(timeout, request).await {
                    Ok(result) => result,
                    Err(_) => Err(GatewayError::Timeout(timeout.as_secs())),
                },
                None => request.await,
            }
        };

        let result = if let Some(token) = cancellation {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(GatewayError::Cancelled),
                result = call => result,
            }
        } else {
            call.await
        };

        match &result {
            Ok(text) => self.conversation_logger.log(ConversationEvent::new(
                "gateway_response",
                json!({
                    "role": role.wire_name(),
                    "bytes": text.len(),
                    "preview": preview(text, PREVIEW_BYTES),
                }),
            )),
            Err(e) => self.conversation_logger.log(ConversationEvent::new(
                "gateway_error",
                json!({
                    "role": role.wire_name(),
                    "error": e.to_string(),
                }),
            )),
        }
        result
    }

    fn log_plan(
        &self,
        session_id: &SessionId,
        source: DirectiveSource,
        directives: &[roundtable_domain::ParsedDirective],
        plan: &TurnPlan,
    ) {
        let kinds: Vec<String> = directives
            .iter()
            .map(|d| match d {
                Ok(directive) => directive.kind().to_string(),
                Err(e) => e.to_string(),
            })
            .collect();
        debug!("Parsed directives: {:?}", kinds);

        self.conversation_logger.log(ConversationEvent::new(
            "turn_plan",
            json!({
                "session_id": session_id.as_str(),
                "source": match source {
                    DirectiveSource::Moderator => "moderator",
                    DirectiveSource::Operator => "operator",
                },
                "directives": kinds,
                "yielded": plan.yielded(),
                "grants": plan.grants().iter().map(|n| n.as_str()).collect::<Vec<_>>(),
                "revocations": plan.revocations().iter().map(|n| n.as_str()).collect::<Vec<_>>(),
                "dispatches": plan.dispatches().iter().map(|n| n.as_str()).collect::<Vec<_>>(),
            }),
        ));
    }
}

fn specialist_error_notice(name: &SpecialistName, error: &GatewayError) -> String {
    format!("{} could not respond: {}", name.display_name(), error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::session_storage::InMemorySessionStorage;
    use async_trait::async_trait;
    use roundtable_domain::{NoteTier, YIELD_NOTICE};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    enum Scripted {
        Reply(String),
        Fail(GatewayError),
        /// Never answers
        Hang,
    }

    /// Gateway that answers from per-role queues and records every call
    #[derive(Default)]
    struct ScriptedGateway {
        queues: Mutex<HashMap<String, VecDeque<Scripted>>>,
        calls: Mutex<Vec<(String, Vec<TranscriptEntry>)>>,
    }

    impl ScriptedGateway {
        fn script(self, role: &str, response: Scripted) -> Self {
            self.queues
                .lock()
                .unwrap()
                .entry(role.to_string())
                .or_default()
                .push_back(response);
            self
        }

        fn reply(self, role: &str, text: &str) -> Self {
            self.script(role, Scripted::Reply(text.to_string()))
        }

        fn called_roles(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(role, _)| role.clone())
                .collect()
        }

        fn transcript_of_call(&self, index: usize) -> Vec<TranscriptEntry> {
            self.calls.lock().unwrap()[index].1.clone()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn invoke(
            &self,
            role: &Role,
            transcript: &[TranscriptEntry],
        ) -> Result<String, GatewayError> {
            let key = role.wire_name();
            self.calls
                .lock()
                .unwrap()
                .push((key.clone(), transcript.to_vec()));
            let next = self
                .queues
                .lock()
                .unwrap()
                .get_mut(&key)
                .and_then(|q| q.pop_front());
            match next {
                Some(Scripted::Reply(text)) => Ok(text),
                Some(Scripted::Fail(e)) => Err(e),
                Some(Scripted::Hang) => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                None => Err(GatewayError::Other(format!("no script for {}", key))),
            }
        }
    }

    /// Records every state change
    #[derive(Default)]
    struct RecordingProgress {
        states: Mutex<Vec<String>>,
    }

    impl RoundProgressNotifier for RecordingProgress {
        fn on_state_change(&self, _session_id: &SessionId, state: &RoundState) {
            self.states.lock().unwrap().push(state.to_string());
        }
    }

    struct Fixture {
        use_case: RunRoundUseCase<ScriptedGateway>,
        gateway: Arc<ScriptedGateway>,
        session_id: SessionId,
    }

    fn fixture(gateway: ScriptedGateway) -> Fixture {
        let roster = Arc::new(Roster::default());
        let storage = Arc::new(InMemorySessionStorage::new());
        let sessions = Arc::new(SessionService::open(storage, &roster).unwrap());
        let session_id = sessions.require_active().unwrap();
        let gateway = Arc::new(gateway);
        let use_case = RunRoundUseCase::new(gateway.clone(), sessions, roster);
        Fixture {
            use_case,
            gateway,
            session_id,
        }
    }

    impl Fixture {
        async fn submit(&self, text: &str) -> RoundOutcome {
            self.use_case
                .execute(RunRoundInput::new(self.session_id.clone(), text))
                .await
                .unwrap()
        }

        fn session(&self) -> roundtable_domain::ChatSession {
            self.use_case.sessions().session(&self.session_id).unwrap()
        }

        fn contents(&self) -> Vec<String> {
            self.session()
                .messages()
                .iter()
                .map(|m| m.content.clone())
                .collect()
        }
    }

    fn name(raw: &str) -> SpecialistName {
        Roster::default().resolve(raw).known().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_grants_dispatch_in_order_with_growing_transcript() {
        let f = fixture(
            ScriptedGateway::default()
                .reply("moderator", "!allowspeak planner\n!allowspeak researcher")
                .reply("assistant-planner", "Plan: three phases.")
                .reply("assistant-researcher", "Data supports phase one."),
        );

        let outcome = f.submit("Help me plan a launch").await;

        assert_eq!(
            f.gateway.called_roles(),
            vec!["moderator", "assistant-planner", "assistant-researcher"]
        );
        let researcher_view = f.gateway.transcript_of_call(2);
        assert!(
            researcher_view
                .iter()
                .any(|e| e.content == "Plan: three phases."
                    && e.role == Role::Assistant(name("planner")))
        );

        let session = f.session();
        assert_eq!(session.conversation_round(), 1);
        assert_eq!(
            session.responded_assistants(),
            &[name("planner"), name("researcher")]
        );
        assert_eq!(outcome.responded().count(), 2);
        assert_eq!(
            f.contents(),
            vec![
                "Help me plan a launch",
                "!allowspeak planner\n!allowspeak researcher",
                "Permission granted for Planner to speak.",
                "Permission granted for Researcher to speak.",
                "Plan: three phases.",
                "Data supports phase one.",
            ]
        );
    }

    #[tokio::test]
    async fn test_specialist_failure_is_isolated() {
        let f = fixture(
            ScriptedGateway::default()
                .reply("moderator", "!allowspeak planner\n!allowspeak researcher")
                .script(
                    "assistant-planner",
                    Scripted::Fail(GatewayError::RequestFailed("503".into())),
                )
                .reply("assistant-researcher", "Here is the research."),
        );

        let outcome = f.submit("go").await;

        assert_eq!(outcome.failures(), 1);
        let session = f.session();
        assert_eq!(session.responded_assistants(), &[name("researcher")]);
        assert_eq!(session.conversation_round(), 1);

        let messages = session.messages();
        let notice = &messages[messages.len() - 2];
        assert_eq!(notice.role, Role::Moderator);
        assert!(notice.content.starts_with("Planner could not respond"));
        let last = messages.last().unwrap();
        assert_eq!(last.role, Role::Assistant(name("researcher")));
    }

    #[tokio::test]
    async fn test_yield_precedence_blocks_dispatch() {
        for reply in ["!allowspeak planner\n!yield", "!yield\n!allowspeak planner"] {
            let f = fixture(ScriptedGateway::default().reply("moderator", reply));
            let outcome = f.submit("thanks, that's all").await;

            assert!(outcome.yielded);
            assert!(!outcome.dispatched());
            assert_eq!(f.gateway.called_roles(), vec!["moderator"]);
            let session = f.session();
            assert!(session.allowed_assistants().is_empty());
            assert_eq!(session.conversation_round(), 0);
            assert_eq!(f.contents().last().unwrap(), YIELD_NOTICE);
        }
    }

    #[tokio::test]
    async fn test_grant_deny_composition() {
        let f = fixture(
            ScriptedGateway::default()
                .reply(
                    "moderator",
                    "!allowspeak researcher\n!allowspeak planner\n!deny researcher",
                )
                .reply("assistant-planner", "ok"),
        );

        f.submit("hello").await;

        assert_eq!(f.session().allowed_assistants(), &[name("planner")]);
        assert_eq!(f.gateway.called_roles(), vec!["moderator", "assistant-planner"]);
    }

    #[tokio::test]
    async fn test_unknown_command_leaves_counters() {
        let f = fixture(ScriptedGateway::default().reply("moderator", "!frobnicate x"));

        let outcome = f.submit("hello").await;

        assert!(!outcome.dispatched());
        let session = f.session();
        assert_eq!(session.conversation_round(), 0);
        assert!(session.allowed_assistants().is_empty());
        assert_eq!(
            f.contents().last().unwrap(),
            "Unknown command received from Moderator: !frobnicate"
        );
    }

    #[tokio::test]
    async fn test_moderator_failure_enters_error_recovery() {
        let f = fixture(ScriptedGateway::default().script(
            "moderator",
            Scripted::Fail(GatewayError::ConnectionError("refused".into())),
        ));
        let progress = RecordingProgress::default();

        let outcome = f
            .use_case
            .execute_with_progress(RunRoundInput::new(f.session_id.clone(), "hi"), &progress)
            .await
            .unwrap();

        assert!(outcome.moderator_failed);
        assert_eq!(
            *progress.states.lock().unwrap(),
            vec!["Moderating", "Recovering from error", "Awaiting user"]
        );
        let contents = f.contents();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0], "hi");
        assert!(contents[1].starts_with(MODERATOR_ERROR_NOTICE));
    }

    #[tokio::test]
    async fn test_ready_sentinel_becomes_notice() {
        let f = fixture(ScriptedGateway::default().reply("moderator", "```\n!OK\n```"));

        let outcome = f
            .use_case
            .start_session(&f.session_id, None, &NoRoundProgress)
            .await
            .unwrap();

        assert!(outcome.session_ready);
        assert_eq!(f.contents(), vec![SESSION_READY_NOTICE]);
    }

    #[tokio::test]
    async fn test_notes_and_user_injection_apply_in_order() {
        let f = fixture(ScriptedGateway::default().reply(
            "moderator",
            "!note {budget is 10k}\n!permanentnote {launch in May}\n!user {also consider hiring}\n!yield",
        ));

        f.submit("plan it").await;

        let session = f.session();
        let docs = session.context_docs();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].tier, NoteTier::Session);
        assert_eq!(docs[1].tier, NoteTier::Permanent);
        let injected = session
            .messages()
            .iter()
            .find(|m| m.content == "also consider hiring")
            .unwrap();
        assert_eq!(injected.role, Role::User);
    }

    #[tokio::test]
    async fn test_context_documents_reach_the_gateway() {
        let f = fixture(
            ScriptedGateway::default()
                .reply("moderator", "!note {remember the budget}")
                .reply("moderator", "!yield"),
        );

        f.submit("first").await;
        f.submit("second").await;

        let second_call = f.gateway.transcript_of_call(1);
        let last = second_call.last().unwrap();
        assert_eq!(last.role, Role::Context);
        assert_eq!(last.content, "Context Document 1: remember the budget");
    }

    #[tokio::test]
    async fn test_gateway_timeout_becomes_notice() {
        let gateway = ScriptedGateway::default()
            .reply("moderator", "!allowspeak mike")
            .script("assistant-mike", Scripted::Hang);
        let f = fixture(gateway);
        let use_case = RunRoundUseCase::new(
            f.gateway.clone(),
            f.use_case.sessions().clone(),
            Arc::new(Roster::default()),
        )
        .with_config(BehaviorConfig {
            timeout: Some(Duration::from_millis(20)),
            ..BehaviorConfig::default()
        });

        let outcome = use_case
            .execute(RunRoundInput::new(f.session_id.clone(), "hi"))
            .await
            .unwrap();

        assert_eq!(
            outcome.turns,
            vec![(name("mike"), TurnResult::Failed(GatewayError::Timeout(0).to_string()))]
        );
        assert!(f.contents().last().unwrap().starts_with("Mike could not respond"));
    }

    #[tokio::test]
    async fn test_cancellation_stops_round() {
        let f = fixture(ScriptedGateway::default().script("moderator", Scripted::Hang));
        let token = CancellationToken::new();
        token.cancel();

        let outcome = f
            .use_case
            .execute(RunRoundInput::new(f.session_id.clone(), "hi").with_cancellation(token))
            .await
            .unwrap();

        assert!(outcome.cancelled);
        assert_eq!(f.contents(), vec!["hi", CANCELLED_NOTICE]);
        assert!(!f.use_case.sessions().is_busy(&f.session_id));
    }

    #[tokio::test]
    async fn test_busy_session_rejects_second_submission() {
        let f = fixture(ScriptedGateway::default());
        let _guard = f.use_case.sessions().begin_round(&f.session_id).unwrap();

        let err = f
            .use_case
            .execute(RunRoundInput::new(f.session_id.clone(), "hi"))
            .await
            .unwrap_err();
        assert!(err.is_busy());
        assert!(f.gateway.called_roles().is_empty());
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let f = fixture(ScriptedGateway::default());
        let err = f
            .use_case
            .execute(RunRoundInput::new(f.session_id.clone(), "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, RunRoundError::EmptyMessage));
    }

    #[tokio::test]
    async fn test_deny_only_reply_revokes_from_open_round() {
        let f = fixture(
            ScriptedGateway::default()
                .reply("moderator", "!allowspeak planner\n!allowspeak mike")
                .reply("assistant-planner", "p")
                .reply("assistant-mike", "m")
                .reply("moderator", "!deny mike"),
        );

        f.submit("one").await;
        f.submit("two").await;

        let session = f.session();
        assert_eq!(session.allowed_assistants(), &[name("planner")]);
        assert_eq!(session.responded_assistants(), &[name("planner")]);
        // no grants in the second reply, so no dispatch and no new round
        assert_eq!(session.conversation_round(), 1);
        assert_eq!(f.gateway.called_roles().len(), 4);
    }

    #[test]
    fn test_operator_commands_apply_without_gateway() {
        let f = fixture(ScriptedGateway::default());

        let outcome = f
            .use_case
            .apply_operator_command(&f.session_id, "!allowspeak planner")
            .unwrap();
        assert_eq!(outcome.directives, 1);
        assert_eq!(f.session().allowed_assistants(), &[name("planner")]);

        f.use_case
            .apply_operator_command(&f.session_id, "!frobnicate")
            .unwrap();
        assert_eq!(f.contents().last().unwrap(), "Unknown command: !frobnicate");

        let outcome = f
            .use_case
            .apply_operator_command(&f.session_id, "!yield")
            .unwrap();
        assert!(outcome.yielded);
        assert!(f.session().allowed_assistants().is_empty());
        assert!(f.gateway.called_roles().is_empty());
    }

    #[test]
    fn test_operator_command_requires_bang() {
        let f = fixture(ScriptedGateway::default());
        assert!(matches!(
            f.use_case.apply_operator_command(&f.session_id, "hello"),
            Err(RunRoundError::NotACommand)
        ));
    }
}
