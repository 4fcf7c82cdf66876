//! Challenge data model.
//!
//! A [`Challenge`] is one concrete, time-boxed instance of a catalog template.
//! Its schedule half (id, window, reward, goal) is produced by the
//! [`ScheduleEngine`](crate::schedule::ScheduleEngine) and is a pure function
//! of the generation date. Its participant half (units, state, milestones)
//! is mutated only by the board that owns it.

mod lifecycle;
mod milestone;
mod requirement;

pub use lifecycle::{ChallengeState, Transition};
pub use milestone::{Milestone, MilestoneEvent, MilestoneSet};
pub use requirement::{Requirement, RequirementKind};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recurrence class of a challenge template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    Weekend,
    Viral,
    Special,
    Seasonal,
}

impl Cadence {
    pub const ALL: [Cadence; 6] = [
        Cadence::Daily,
        Cadence::Weekly,
        Cadence::Weekend,
        Cadence::Viral,
        Cadence::Special,
        Cadence::Seasonal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::Weekend => "weekend",
            Cadence::Viral => "viral",
            Cadence::Special => "special",
            Cadence::Seasonal => "seasonal",
        }
    }

    /// Number of challenges this cadence produces per generation day.
    pub fn slots(&self) -> u32 {
        match self {
            Cadence::Daily => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Cadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cadence::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown cadence: {s}"))
    }
}

/// Ordinal difficulty. Determines how long a challenge stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
    Master,
}

impl Difficulty {
    /// Open window length in hours.
    pub fn duration_hours(&self) -> i64 {
        match self {
            Difficulty::Easy => 24,
            Difficulty::Medium => 48,
            Difficulty::Hard => 72,
            Difficulty::Expert => 168,
            Difficulty::Master => 336,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::hours(self.duration_hours())
    }

    /// Map a template's point reward to a difficulty tier.
    pub fn from_reward_points(points: u32) -> Self {
        match points {
            0..=99 => Difficulty::Easy,
            100..=199 => Difficulty::Medium,
            200..=349 => Difficulty::Hard,
            350..=599 => Difficulty::Expert,
            _ => Difficulty::Master,
        }
    }
}

/// Points plus the secondary currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    pub points: u32,
    pub coins: u32,
}

impl Reward {
    pub const fn new(points: u32, coins: u32) -> Self {
        Self { points, coins }
    }

    /// Scale both currencies by `factor`, rounding down.
    pub fn scaled(&self, factor: f64) -> Reward {
        let scale = |v: u32| (v as f64 * factor.max(0.0)).floor() as u32;
        Reward {
            points: scale(self.points),
            coins: scale(self.coins),
        }
    }

    pub fn saturating_add(self, other: Reward) -> Reward {
        Reward {
            points: self.points.saturating_add(other.points),
            coins: self.coins.saturating_add(other.coins),
        }
    }
}

/// How base rewards turn into awarded rewards.
///
/// The premium multiplier applies to points and coins alike, for milestone
/// partials and for completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardPolicy {
    pub premium: bool,
    pub premium_multiplier: u32,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            premium: false,
            premium_multiplier: 2,
        }
    }
}

impl RewardPolicy {
    pub fn factor(&self) -> f64 {
        if self.premium {
            self.premium_multiplier.max(1) as f64
        } else {
            1.0
        }
    }

    pub fn completion(&self, base: Reward) -> Reward {
        base.scaled(self.factor())
    }

    /// Partial reward for an intermediate milestone. The completion
    /// milestone is worth the full reward.
    pub fn milestone(&self, base: Reward, milestone: Milestone) -> Reward {
        base.scaled(milestone.threshold() * self.factor())
    }
}

/// A concrete challenge instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub cadence: Cadence,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub hashtag: String,
    pub difficulty: Difficulty,
    pub reward: Reward,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub requirements: Vec<String>,
    pub goal: Requirement,
    #[serde(default)]
    pub units: u32,
    #[serde(default)]
    pub progress: f64,
    pub state: ChallengeState,
    #[serde(default)]
    pub milestones: MilestoneSet,
    pub participants: u32,
    pub completions: u32,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub awarded: Option<Reward>,
}

impl Challenge {
    /// `now` falls inside the half-open window `[starts_at, ends_at)`.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now < self.ends_at
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.state.is_terminal() && self.contains(now)
    }

    /// Participant opted in and the challenge can still make progress.
    pub fn is_tracking(&self) -> bool {
        matches!(self.state, ChallengeState::Joined | ChallengeState::InProgress)
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.ends_at - now).max(Duration::zero())
    }

    /// Add `units` toward the goal, returning `(old, new)` progress.
    ///
    /// Progress is derived from the integer unit count so repeated
    /// increments never drift and `1.0` is reached exactly.
    pub(crate) fn advance(&mut self, units: u32) -> (f64, f64) {
        let old = self.progress;
        let target = self.goal.target.max(1);
        self.units = self.units.saturating_add(units).min(target);
        self.progress = (self.units as f64 / target as f64).clamp(0.0, 1.0);
        (old, self.progress)
    }

    /// Overwrite the unit count, e.g. from a persisted snapshot.
    pub(crate) fn restore_units(&mut self, units: u32) {
        self.units = 0;
        self.progress = 0.0;
        self.advance(units);
    }

    /// Units still needed to reach the goal.
    pub fn remaining_units(&self) -> u32 {
        self.goal.target.saturating_sub(self.units)
    }
}
