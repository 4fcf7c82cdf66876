//! The challenge board: one participant's view of the challenge system.
//!
//! Composes the [`ActiveSetMaintainer`] and [`ProgressTracker`] and is the
//! single writer of challenge state. Every call takes `now` explicitly and
//! every participant-visible change is queued in an outbox, drained with
//! [`ChallengeBoard::take_events`] once the state change is complete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::active::ActiveSetMaintainer;
use crate::catalog::{TemplateCatalog, CATALOG_VERSION};
use crate::challenge::{Challenge, ChallengeState, MilestoneSet, RequirementKind, Reward, Transition};
use crate::error::Result;
use crate::events::ChallengeEvent;
use crate::progress::{ChallengeActionEvent, ProgressOutcome, ProgressTracker, TrackingSession};
use crate::schedule::ScheduleEngine;
use crate::storage::ChallengeConfig;

/// Why a join did or did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
    NotStarted,
    Expired,
    /// Premium challenge and the participant is not premium.
    PremiumRequired,
    /// Already completed.
    Finished,
    NotFound,
}

impl JoinOutcome {
    pub fn is_joined(&self) -> bool {
        matches!(self, JoinOutcome::Joined)
    }
}

/// Participant half of a challenge, as persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: String,
    pub state: ChallengeState,
    pub units: u32,
    #[serde(default)]
    pub milestones: MilestoneSet,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub awarded: Option<Reward>,
}

impl ParticipantRecord {
    fn of(challenge: &Challenge) -> Self {
        Self {
            id: challenge.id.clone(),
            state: challenge.state,
            units: challenge.units,
            milestones: challenge.milestones,
            joined_at: challenge.joined_at,
            completed_at: challenge.completed_at,
            awarded: challenge.awarded,
        }
    }

    fn apply_to(&self, challenge: &mut Challenge) {
        challenge.state = self.state;
        challenge.restore_units(self.units);
        challenge.milestones = self.milestones;
        challenge.joined_at = self.joined_at;
        challenge.completed_at = self.completed_at;
        challenge.awarded = self.awarded;
    }
}

/// Everything needed to rebuild a board's participant state. Schedule data
/// is regenerated, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub version: u32,
    /// Last refresh of the board that wrote the snapshot.
    #[serde(default)]
    pub refreshed_at: Option<DateTime<Utc>>,
    pub records: Vec<ParticipantRecord>,
    #[serde(default)]
    pub sessions: Vec<TrackingSession>,
}

pub struct ChallengeBoard {
    config: ChallengeConfig,
    active: ActiveSetMaintainer,
    tracker: ProgressTracker,
    outbox: Vec<ChallengeEvent>,
}

impl ChallengeBoard {
    /// Build a board from validated configuration. Nothing is generated
    /// until the first [`start`](Self::start) or [`recompute`](Self::recompute).
    pub fn new(config: ChallengeConfig) -> Result<Self> {
        config.validate()?;
        let engine = ScheduleEngine::new(TemplateCatalog);
        let active = ActiveSetMaintainer::new(
            engine,
            config.schedule.window_days,
            config.recompute_interval(),
        );
        let tracker = ProgressTracker::new(config.reward_policy(), config.tracking.event_history);
        Ok(Self {
            config,
            active,
            tracker,
            outbox: Vec::new(),
        })
    }

    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    /// Initial load.
    pub fn start(&mut self, now: DateTime<Utc>) -> Vec<&Challenge> {
        info!(window_days = self.config.schedule.window_days, "challenge board starting");
        self.recompute(now)
    }

    /// Regenerate and sweep unconditionally, returning the active set.
    pub fn recompute(&mut self, now: DateTime<Utc>) -> Vec<&Challenge> {
        self.refresh(now);
        self.active.active()
    }

    fn refresh(&mut self, now: DateTime<Utc>) {
        for id in self.active.refresh(now) {
            self.push_expired(&id, now);
        }
    }

    fn refresh_if_due(&mut self, now: DateTime<Utc>) {
        if self.active.due(now) {
            self.refresh(now);
        }
    }

    fn push_expired(&mut self, id: &str, now: DateTime<Utc>) {
        let progress = self.active.get(id).map(|c| c.progress).unwrap_or_default();
        info!(challenge = %id, progress, "joined challenge expired");
        if let Some(event) = self.tracker.stop_tracking(id, now) {
            self.outbox.push(event);
        }
        self.outbox.push(ChallengeEvent::Expired {
            challenge_id: id.to_string(),
            progress,
            at: now,
        });
    }

    /// The single periodic entry point: recompute when due, then advance
    /// timed sessions.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.refresh_if_due(now);
        let events = self.tracker.tick(now, &mut self.active);
        self.outbox.extend(events);
    }

    /// The active set as of the last recompute, ascending by end time.
    pub fn active(&self) -> Vec<&Challenge> {
        self.active.active()
    }

    pub fn get(&self, id: &str) -> Option<&Challenge> {
        self.active.get(id)
    }

    /// Every retained challenge the participant has joined, in any state.
    pub fn joined(&self) -> Vec<&Challenge> {
        let mut joined: Vec<&Challenge> = self
            .active
            .records()
            .filter(|c| c.joined_at.is_some())
            .collect();
        joined.sort_by(|a, b| a.ends_at.cmp(&b.ends_at).then_with(|| a.id.cmp(&b.id)));
        joined
    }

    pub fn join(&mut self, id: &str, now: DateTime<Utc>) -> JoinOutcome {
        self.refresh_if_due(now);
        if self.active.expire_if_due(id, now) {
            self.push_expired(id, now);
        }

        let premium = self.config.rewards.premium;
        let Some(challenge) = self.active.get_mut(id) else {
            return JoinOutcome::NotFound;
        };
        let outcome = match challenge.state {
            ChallengeState::Completed => JoinOutcome::Finished,
            ChallengeState::Expired => JoinOutcome::Expired,
            ChallengeState::Joined | ChallengeState::InProgress => JoinOutcome::AlreadyJoined,
            ChallengeState::Available if now < challenge.starts_at => JoinOutcome::NotStarted,
            ChallengeState::Available if challenge.is_premium && !premium => {
                JoinOutcome::PremiumRequired
            }
            ChallengeState::Available => {
                challenge.state.apply(Transition::Join);
                challenge.joined_at = Some(now);
                JoinOutcome::Joined
            }
        };
        if !outcome.is_joined() {
            debug!(challenge = %id, ?outcome, "join rejected");
            return outcome;
        }

        let timed = challenge.goal.kind == RequirementKind::Timed;
        info!(challenge = %id, "joined challenge");
        self.outbox.push(ChallengeEvent::Joined {
            challenge_id: id.to_string(),
            at: now,
        });
        if timed {
            if let Some(event) = self.tracker.start_tracking(id, now, &self.active) {
                self.outbox.push(event);
            }
        }
        outcome
    }

    /// Route an activity event into every joined challenge it matches.
    /// Returns how many challenge events it produced.
    ///
    /// `event.at` decides which windows the event falls in; it never moves
    /// the board's own clock, so late deliveries cannot rewind the window.
    pub fn submit(&mut self, event: ChallengeActionEvent) -> usize {
        let events = self.tracker.submit(event, &mut self.active);
        let produced = events.len();
        self.outbox.extend(events);
        produced
    }

    /// Explicit one-unit submission for a single challenge.
    pub fn submit_entry(&mut self, id: &str, now: DateTime<Utc>) -> ProgressOutcome {
        self.refresh_if_due(now);
        if self.active.expire_if_due(id, now) {
            self.push_expired(id, now);
        }
        let (outcome, events) = self.tracker.submit_entry(id, now, &mut self.active);
        self.outbox.extend(events);
        outcome
    }

    /// Returns `false` if no session could be started.
    pub fn start_tracking(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        match self.tracker.start_tracking(id, now, &self.active) {
            Some(event) => {
                self.outbox.push(event);
                true
            }
            None => false,
        }
    }

    /// Idempotent: stopping a session that does not exist does nothing.
    pub fn stop_tracking(&mut self, id: &str, now: DateTime<Utc>) {
        if let Some(event) = self.tracker.stop_tracking(id, now) {
            self.outbox.push(event);
        }
    }

    pub fn session(&self, id: &str) -> Option<&TrackingSession> {
        self.tracker.session(id)
    }

    pub fn history(&self, limit: usize) -> Vec<ChallengeActionEvent> {
        self.tracker.history(limit)
    }

    /// Drain queued events in emission order.
    pub fn take_events(&mut self) -> Vec<ChallengeEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_events(&self) -> usize {
        self.outbox.len()
    }

    /// Participant state of every challenge the participant touched.
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut records: Vec<ParticipantRecord> = self
            .active
            .records()
            .filter(|c| c.joined_at.is_some())
            .map(ParticipantRecord::of)
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        let mut sessions: Vec<TrackingSession> = self.tracker.sessions().cloned().collect();
        sessions.sort_by(|a, b| a.challenge_id.cmp(&b.challenge_id));
        BoardSnapshot {
            version: CATALOG_VERSION,
            refreshed_at: self.active.last_refresh(),
            records,
            sessions,
        }
    }

    /// Overlay a saved snapshot, then bring the board forward to `now`.
    ///
    /// Records are applied to the window as it stood when the snapshot was
    /// written, so joined challenges that ended in between are expired and
    /// announced rather than lost. A snapshot written against another
    /// catalog version is discarded whole, since its ids may name different
    /// templates.
    pub fn restore(&mut self, snapshot: BoardSnapshot, now: DateTime<Utc>) {
        self.active.refresh(snapshot.refreshed_at.unwrap_or(now));
        if snapshot.version != CATALOG_VERSION {
            warn!(
                found = snapshot.version,
                expected = CATALOG_VERSION,
                "discarding snapshot from another catalog version"
            );
            self.refresh(now);
            return;
        }

        let mut restored = 0usize;
        for record in &snapshot.records {
            match self.active.get_mut(&record.id) {
                Some(challenge) => {
                    record.apply_to(challenge);
                    restored += 1;
                }
                None => debug!(challenge = %record.id, "snapshot record left the window"),
            }
        }
        for session in snapshot.sessions {
            if self
                .active
                .get(&session.challenge_id)
                .is_some_and(|c| c.is_tracking())
            {
                self.tracker.restore_session(session);
            }
        }
        debug!(restored, "snapshot restored");
        self.refresh(now);
    }
}
