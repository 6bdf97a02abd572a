//! Progress reporting while a round runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use roundtable_application::ports::progress::RoundProgressNotifier;
use roundtable_domain::{RoundOutcome, RoundState, SessionId, SpecialistName};
use std::sync::Mutex;
use std::time::Duration;

/// Spinner showing who the panel is waiting on
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn waiting_message(state: &RoundState) -> Option<String> {
        match state {
            RoundState::Moderating => Some("Moderator is deciding who speaks...".to_string()),
            RoundState::Dispatching(name) => {
                Some(format!("{} is responding...", name.display_name()))
            }
            RoundState::AwaitingUser | RoundState::ErrorRecovery => None,
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundProgressNotifier for ProgressReporter {
    fn on_state_change(&self, _session_id: &SessionId, state: &RoundState) {
        let Ok(mut spinner) = self.spinner.lock() else {
            return;
        };

        match Self::waiting_message(state) {
            Some(message) => {
                let pb = spinner.get_or_insert_with(|| {
                    let pb = ProgressBar::new_spinner();
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(100));
                    pb
                });
                pb.set_message(message);
            }
            None => {
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
            }
        }
    }

    fn on_turn_complete(&self, name: &SpecialistName, success: bool) {
        if let Ok(spinner) = self.spinner.lock()
            && let Some(pb) = spinner.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), name.display_name())
            } else {
                format!("{} {}", "x".red(), name.display_name())
            };
            pb.println(status);
        }
    }
}

/// Plain text progress (no spinner)
pub struct SimpleProgress;

impl RoundProgressNotifier for SimpleProgress {
    fn on_state_change(&self, _session_id: &SessionId, state: &RoundState) {
        if let Some(message) = ProgressReporter::waiting_message(state) {
            println!("{} {}", "->".cyan(), message);
        }
    }

    fn on_turn_complete(&self, name: &SpecialistName, success: bool) {
        if success {
            println!("  {} {}", "v".green(), name.display_name());
        } else {
            println!("  {} {} (failed)", "x".red(), name.display_name());
        }
    }

    fn on_round_complete(&self, _session_id: &SessionId, outcome: &RoundOutcome) {
        if outcome.dispatched() {
            println!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::Roster;

    #[test]
    fn test_waiting_messages() {
        let planner = Roster::default().resolve("planner").known().cloned().unwrap();
        assert_eq!(
            ProgressReporter::waiting_message(&RoundState::Dispatching(planner)).as_deref(),
            Some("Planner is responding...")
        );
        assert!(ProgressReporter::waiting_message(&RoundState::AwaitingUser).is_none());
    }

    #[test]
    fn test_spinner_cleared_when_round_ends() {
        let reporter = ProgressReporter::new();
        let id = SessionId::from("s1");

        reporter.on_state_change(&id, &RoundState::Moderating);
        assert!(reporter.spinner.lock().unwrap().is_some());

        reporter.on_state_change(&id, &RoundState::AwaitingUser);
        assert!(reporter.spinner.lock().unwrap().is_none());
    }
}
