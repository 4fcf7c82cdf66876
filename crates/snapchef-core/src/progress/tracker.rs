//! Event matching, progress accumulation and timed sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use super::action::{ActionKind, ChallengeActionEvent, EventLog};
use super::session::TrackingSession;
use crate::active::ActiveSetMaintainer;
use crate::challenge::{MilestoneEvent, Requirement, RequirementKind, Reward, RewardPolicy, Transition};
use crate::events::ChallengeEvent;

/// Result of a direct progress submission against one challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProgressOutcome {
    Advanced { units: u32, target: u32, progress: f64 },
    Completed { reward: Reward },
    NotFound,
    /// The participant has not joined.
    NotJoined,
    /// Completed, expired, or outside its window at the submission time.
    Closed,
}

/// Units `event` contributes toward `goal`. Zero means the event is not
/// relevant to the challenge.
pub fn units_for(goal: &Requirement, challenge_id: &str, event: &ChallengeActionEvent) -> u32 {
    use ActionKind as A;
    use RequirementKind as R;

    match (goal.kind, event.kind) {
        (R::Recipes, A::RecipeCreated)
        | (R::Shares, A::RecipeShared)
        | (R::Ratings, A::RatingGiven)
        | (R::Photos, A::PhotoUploaded)
        | (R::Scans, A::IngredientsScanned) => 1,
        (R::PerfectRatings, A::RatingGiven)
            if event.meta_f64("rating").is_some_and(|r| r >= 5.0) =>
        {
            1
        }
        // A finished session satisfies the whole timed goal at once.
        (R::Timed, A::TimeCompleted) if event.meta_str("challenge_id") == Some(challenge_id) => {
            goal.target
        }
        _ => 0,
    }
}

/// Routes participant activity into joined challenges.
///
/// Holds no challenge data itself; every call borrows the
/// [`ActiveSetMaintainer`] that owns the records.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    sessions: HashMap<String, TrackingSession>,
    log: EventLog,
    policy: RewardPolicy,
}

impl ProgressTracker {
    pub fn new(policy: RewardPolicy, history: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            log: EventLog::new(history),
            policy,
        }
    }

    pub fn policy(&self) -> RewardPolicy {
        self.policy
    }

    /// Apply one activity event to every joined challenge it matches.
    ///
    /// Challenges are visited in deadline order, so the one closest to
    /// expiry is credited first.
    pub fn submit(
        &mut self,
        event: ChallengeActionEvent,
        active: &mut ActiveSetMaintainer,
    ) -> Vec<ChallengeEvent> {
        let mut out = Vec::new();
        for id in active.tracking_ids(event.at) {
            let Some(challenge) = active.get(&id) else {
                continue;
            };
            let units = units_for(&challenge.goal, &id, &event);
            if units == 0 {
                continue;
            }
            debug!(challenge = %id, kind = ?event.kind, units, "activity matched");
            self.apply(&id, units, &event.metadata, event.at, active, &mut out);
        }
        self.log.push(event);
        out
    }

    /// Advance one unit on `id` regardless of its requirement kind.
    pub fn submit_entry(
        &mut self,
        id: &str,
        at: DateTime<Utc>,
        active: &mut ActiveSetMaintainer,
    ) -> (ProgressOutcome, Vec<ChallengeEvent>) {
        let mut out = Vec::new();
        let outcome = match active.get(id) {
            None => ProgressOutcome::NotFound,
            Some(c) if c.state.is_terminal() || !c.contains(at) => ProgressOutcome::Closed,
            Some(c) if !c.is_tracking() => ProgressOutcome::NotJoined,
            Some(_) => self.apply(id, 1, &BTreeMap::new(), at, active, &mut out),
        };
        (outcome, out)
    }

    fn apply(
        &mut self,
        id: &str,
        units: u32,
        metadata: &BTreeMap<String, serde_json::Value>,
        at: DateTime<Utc>,
        active: &mut ActiveSetMaintainer,
        out: &mut Vec<ChallengeEvent>,
    ) -> ProgressOutcome {
        let policy = self.policy;
        let Some(challenge) = active.get_mut(id) else {
            return ProgressOutcome::NotFound;
        };
        if !challenge.is_tracking() {
            return ProgressOutcome::Closed;
        }

        let (old, new) = challenge.advance(units);
        let target = challenge.goal.target.max(1);
        let reached_target = challenge.units >= target;
        challenge.state.apply(Transition::Progress { reached_target });

        out.push(ChallengeEvent::ProgressUpdated {
            challenge_id: id.to_string(),
            old_progress: old,
            progress: new,
            units: challenge.units,
            target,
            metadata: metadata.clone(),
            at,
        });

        if let Some(milestone) = challenge.milestones.cross(old, new) {
            out.push(ChallengeEvent::MilestoneReached(MilestoneEvent {
                challenge_id: id.to_string(),
                milestone,
                reward: policy.milestone(challenge.reward, milestone),
                at,
            }));
        }

        if !reached_target {
            return ProgressOutcome::Advanced {
                units: challenge.units,
                target,
                progress: new,
            };
        }

        let reward = policy.completion(challenge.reward);
        challenge.completed_at = Some(at);
        challenge.awarded = Some(reward);
        info!(challenge = %id, points = reward.points, coins = reward.coins, "challenge completed");
        out.push(ChallengeEvent::Completed {
            challenge: Box::new(challenge.clone()),
            reward,
            at,
        });
        self.sessions.remove(id);
        ProgressOutcome::Completed { reward }
    }

    /// Open a timing session on a joined timed challenge.
    ///
    /// Returns `None` when the challenge is not timed, not joined, or
    /// already has a session.
    pub fn start_tracking(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
        active: &ActiveSetMaintainer,
    ) -> Option<ChallengeEvent> {
        let challenge = active.get(id)?;
        if challenge.goal.kind != RequirementKind::Timed
            || !challenge.is_tracking()
            || self.sessions.contains_key(id)
        {
            return None;
        }
        let session = TrackingSession::new(id, now, challenge.goal.target);
        let target_minutes = session.target_minutes;
        self.sessions.insert(id.to_string(), session);
        debug!(challenge = %id, target_minutes, "tracking started");
        Some(ChallengeEvent::TrackingStarted {
            challenge_id: id.to_string(),
            target_minutes,
            at: now,
        })
    }

    /// Drop a session. Stopping an unknown session is a no-op.
    pub fn stop_tracking(&mut self, id: &str, now: DateTime<Utc>) -> Option<ChallengeEvent> {
        self.sessions.remove(id)?;
        debug!(challenge = %id, "tracking stopped");
        Some(ChallengeEvent::TrackingStopped {
            challenge_id: id.to_string(),
            at: now,
        })
    }

    /// Advance every session to `now`. A session reaching its target turns
    /// into a `time_completed` activity routed through [`submit`](Self::submit).
    pub fn tick(
        &mut self,
        now: DateTime<Utc>,
        active: &mut ActiveSetMaintainer,
    ) -> Vec<ChallengeEvent> {
        self.sessions
            .retain(|id, _| active.get(id).is_some_and(|c| c.is_tracking()));

        let mut finished: Vec<(String, u32)> = self
            .sessions
            .values_mut()
            .filter_map(|s| s.advance(now).then(|| (s.challenge_id.clone(), s.elapsed_minutes)))
            .collect();
        finished.sort();

        let mut out = Vec::new();
        for (id, elapsed_minutes) in finished {
            out.push(ChallengeEvent::TimeCompleted {
                challenge_id: id.clone(),
                elapsed_minutes,
                at: now,
            });
            let event = ChallengeActionEvent::new(ActionKind::TimeCompleted, now)
                .with_meta("challenge_id", id)
                .with_meta("elapsed_minutes", elapsed_minutes);
            out.extend(self.submit(event, active));
        }
        out
    }

    pub fn session(&self, id: &str) -> Option<&TrackingSession> {
        self.sessions.get(id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &TrackingSession> {
        self.sessions.values()
    }

    pub(crate) fn restore_session(&mut self, session: TrackingSession) {
        self.sessions.insert(session.challenge_id.clone(), session);
    }

    /// Up to `limit` submitted events, newest first.
    pub fn history(&self, limit: usize) -> Vec<ChallengeActionEvent> {
        self.log.recent(limit)
    }
}
