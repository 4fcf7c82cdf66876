//! Participant activity and progress.

mod action;
mod session;
mod tracker;

pub use action::{ActionKind, ChallengeActionEvent, EventLog};
pub use session::TrackingSession;
pub use tracker::{units_for, ProgressOutcome, ProgressTracker};
