//! Progress notification port
//!
//! Defines the interface for reporting progress while a round runs.

use roundtable_domain::{RoundOutcome, RoundState, SessionId, SpecialistName};

/// Callback for progress updates during a round
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain log lines, etc.)
pub trait RoundProgressNotifier: Send + Sync {
    /// Called on every dispatcher state change
    fn on_state_change(&self, session_id: &SessionId, state: &RoundState);

    /// Called when a specialist turn ends
    fn on_turn_complete(&self, _name: &SpecialistName, _success: bool) {}

    /// Called once the round is back at `AwaitingUser`
    fn on_round_complete(&self, _session_id: &SessionId, _outcome: &RoundOutcome) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoRoundProgress;

impl RoundProgressNotifier for NoRoundProgress {
    fn on_state_change(&self, _session_id: &SessionId, _state: &RoundState) {}
}
