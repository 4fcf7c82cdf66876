//! Challenge lifecycle state machine.
//!
//! ```text
//! Available -> Joined -> InProgress -> Completed
//!     \          \          \
//!      +----------+----------+-------> Expired
//! ```
//!
//! `Completed` and `Expired` are terminal. A transition that is not allowed
//! from the current state is simply not applied; callers get `None` back and
//! the state is unchanged. This keeps replays of at-least-once deliveries
//! harmless.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeState {
    /// Generated, participant has not opted in.
    #[default]
    Available,
    /// Opted in, no progress yet.
    Joined,
    InProgress,
    Completed,
    Expired,
}

/// Inputs that drive the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Join,
    /// A progress increment; `reached_target` is true when it fills the goal.
    Progress { reached_target: bool },
    Expire,
}

impl ChallengeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChallengeState::Completed | ChallengeState::Expired)
    }

    /// Next state for `transition`, or `None` if it does not apply.
    pub fn next(self, transition: Transition) -> Option<ChallengeState> {
        use ChallengeState::*;

        match (self, transition) {
            (Available, Transition::Join) => Some(Joined),
            (Joined | InProgress, Transition::Progress { reached_target: false }) => {
                Some(InProgress)
            }
            (Joined | InProgress, Transition::Progress { reached_target: true }) => {
                Some(Completed)
            }
            (Available | Joined | InProgress, Transition::Expire) => Some(Expired),
            _ => None,
        }
    }

    /// Apply `transition` in place. Returns whether anything changed.
    pub fn apply(&mut self, transition: Transition) -> bool {
        match self.next(transition) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let mut state = ChallengeState::Available;
        assert!(state.apply(Transition::Join));
        assert_eq!(state, ChallengeState::Joined);
        assert!(state.apply(Transition::Progress { reached_target: false }));
        assert_eq!(state, ChallengeState::InProgress);
        assert!(state.apply(Transition::Progress { reached_target: true }));
        assert_eq!(state, ChallengeState::Completed);
    }

    #[test]
    fn single_unit_goal_completes_from_joined() {
        assert_eq!(
            ChallengeState::Joined.next(Transition::Progress { reached_target: true }),
            Some(ChallengeState::Completed)
        );
    }

    #[test]
    fn double_join_not_applied() {
        assert_eq!(ChallengeState::Joined.next(Transition::Join), None);
        assert_eq!(ChallengeState::InProgress.next(Transition::Join), None);
    }

    #[test]
    fn progress_requires_join() {
        assert_eq!(
            ChallengeState::Available.next(Transition::Progress { reached_target: false }),
            None
        );
    }

    #[test]
    fn terminal_states_are_absorbing() {
        for terminal in [ChallengeState::Completed, ChallengeState::Expired] {
            for t in [
                Transition::Join,
                Transition::Progress { reached_target: false },
                Transition::Progress { reached_target: true },
                Transition::Expire,
            ] {
                let mut s = terminal;
                assert!(!s.apply(t));
                assert_eq!(s, terminal);
            }
        }
    }

    #[test]
    fn any_open_state_expires() {
        for s in [
            ChallengeState::Available,
            ChallengeState::Joined,
            ChallengeState::InProgress,
        ] {
            assert_eq!(s.next(Transition::Expire), Some(ChallengeState::Expired));
        }
    }
}
