use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::challenge::{Challenge, MilestoneEvent, Reward};

/// Every participant-visible state change produces a ChallengeEvent.
///
/// The board queues them after its own state is fully updated; persistence
/// and notification collaborators consume them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChallengeEvent {
    Joined {
        challenge_id: String,
        at: DateTime<Utc>,
    },
    ProgressUpdated {
        challenge_id: String,
        old_progress: f64,
        progress: f64,
        units: u32,
        target: u32,
        /// Metadata of the activity that caused the update.
        metadata: BTreeMap<String, serde_json::Value>,
        at: DateTime<Utc>,
    },
    MilestoneReached(MilestoneEvent),
    Completed {
        challenge: Box<Challenge>,
        reward: Reward,
        at: DateTime<Utc>,
    },
    /// A joined challenge ran out of time before completion.
    Expired {
        challenge_id: String,
        progress: f64,
        at: DateTime<Utc>,
    },
    TrackingStarted {
        challenge_id: String,
        target_minutes: u32,
        at: DateTime<Utc>,
    },
    TrackingStopped {
        challenge_id: String,
        at: DateTime<Utc>,
    },
    /// A timed session reached its target duration.
    TimeCompleted {
        challenge_id: String,
        elapsed_minutes: u32,
        at: DateTime<Utc>,
    },
}

impl ChallengeEvent {
    pub fn challenge_id(&self) -> &str {
        match self {
            ChallengeEvent::Joined { challenge_id, .. }
            | ChallengeEvent::ProgressUpdated { challenge_id, .. }
            | ChallengeEvent::Expired { challenge_id, .. }
            | ChallengeEvent::TrackingStarted { challenge_id, .. }
            | ChallengeEvent::TrackingStopped { challenge_id, .. }
            | ChallengeEvent::TimeCompleted { challenge_id, .. } => challenge_id,
            ChallengeEvent::MilestoneReached(m) => &m.challenge_id,
            ChallengeEvent::Completed { challenge, .. } => &challenge.id,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            ChallengeEvent::Joined { at, .. }
            | ChallengeEvent::ProgressUpdated { at, .. }
            | ChallengeEvent::Completed { at, .. }
            | ChallengeEvent::Expired { at, .. }
            | ChallengeEvent::TrackingStarted { at, .. }
            | ChallengeEvent::TrackingStopped { at, .. }
            | ChallengeEvent::TimeCompleted { at, .. } => *at,
            ChallengeEvent::MilestoneReached(m) => m.at,
        }
    }
}
