//! Round lifecycle
//!
//! A round runs from a user message through the moderator's reply and the
//! dispatches it grants. The dispatcher moves through [`RoundState`]s and
//! reports the result as a [`RoundOutcome`].

use crate::roster::SpecialistName;
use serde::{Deserialize, Serialize};

/// Where the dispatcher is within a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "specialist")]
pub enum RoundState {
    /// Idle; the next user submission starts a round
    AwaitingUser,
    /// Waiting for the moderator's reply
    Moderating,
    /// Invoking a granted specialist
    Dispatching(SpecialistName),
    /// The moderator failed; always followed by `AwaitingUser`
    ErrorRecovery,
}

impl RoundState {
    pub fn as_str(&self) -> &str {
        match self {
            RoundState::AwaitingUser => "awaiting_user",
            RoundState::Moderating => "moderating",
            RoundState::Dispatching(_) => "dispatching",
            RoundState::ErrorRecovery => "error_recovery",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, RoundState::AwaitingUser)
    }

    /// Whether the dispatcher may move from `self` to `next`
    pub fn can_transition_to(&self, next: &RoundState) -> bool {
        use RoundState::*;
        matches!(
            (self, next),
            (AwaitingUser, Moderating)
                | (Moderating, Dispatching(_))
                | (Moderating, AwaitingUser)
                | (Moderating, ErrorRecovery)
                | (Dispatching(_), Dispatching(_))
                | (Dispatching(_), AwaitingUser)
                | (ErrorRecovery, AwaitingUser)
        )
    }
}

impl std::fmt::Display for RoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundState::AwaitingUser => write!(f, "Awaiting user"),
            RoundState::Moderating => write!(f, "Moderating"),
            RoundState::Dispatching(name) => write!(f, "Dispatching to {}", name.display_name()),
            RoundState::ErrorRecovery => write!(f, "Recovering from error"),
        }
    }
}

/// How a specialist turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnResult {
    Responded,
    Failed(String),
}

/// Summary of one round, for the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundOutcome {
    /// The moderator call failed and nothing was dispatched
    pub moderator_failed: bool,
    /// The moderator replied with the readiness sentinel
    pub session_ready: bool,
    pub yielded: bool,
    /// The round was interrupted before it finished
    pub cancelled: bool,
    /// Specialists invoked, in order
    pub turns: Vec<(SpecialistName, TurnResult)>,
}

impl RoundOutcome {
    pub fn responded(&self) -> impl Iterator<Item = &SpecialistName> {
        self.turns
            .iter()
            .filter(|(_, result)| *result == TurnResult::Responded)
            .map(|(name, _)| name)
    }

    pub fn failures(&self) -> usize {
        self.turns
            .iter()
            .filter(|(_, result)| matches!(result, TurnResult::Failed(_)))
            .count()
    }

    pub fn dispatched(&self) -> bool {
        !self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;

    #[test]
    fn test_transitions() {
        let planner = Roster::default().resolve("planner").known().cloned().unwrap();
        let dispatching = RoundState::Dispatching(planner);

        assert!(RoundState::AwaitingUser.can_transition_to(&RoundState::Moderating));
        assert!(RoundState::Moderating.can_transition_to(&dispatching));
        assert!(dispatching.can_transition_to(&RoundState::AwaitingUser));
        assert!(RoundState::ErrorRecovery.can_transition_to(&RoundState::AwaitingUser));

        assert!(!RoundState::AwaitingUser.can_transition_to(&dispatching));
        assert!(!RoundState::ErrorRecovery.can_transition_to(&RoundState::Moderating));
        assert!(!dispatching.can_transition_to(&RoundState::ErrorRecovery));
    }

    #[test]
    fn test_display() {
        let name = Roster::default()
            .resolve("software engineer")
            .known()
            .cloned()
            .unwrap();
        assert_eq!(
            RoundState::Dispatching(name).to_string(),
            "Dispatching to Software Engineer"
        );
        assert_eq!(RoundState::AwaitingUser.to_string(), "Awaiting user");
    }

    #[test]
    fn test_outcome_counts() {
        let roster = Roster::default();
        let planner = roster.resolve("planner").known().cloned().unwrap();
        let mike = roster.resolve("mike").known().cloned().unwrap();
        let outcome = RoundOutcome {
            turns: vec![
                (planner, TurnResult::Failed("timeout".into())),
                (mike.clone(), TurnResult::Responded),
            ],
            ..Default::default()
        };
        assert_eq!(outcome.failures(), 1);
        assert_eq!(outcome.responded().collect::<Vec<_>>(), vec![&mike]);
        assert!(outcome.dispatched());
    }
}
