//! Progress milestones.
//!
//! Four fixed thresholds. At most one fires per progress update and each
//! fires at most once over a challenge's lifetime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Reward;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Quarter,
    Half,
    ThreeQuarters,
    Complete,
}

impl Milestone {
    pub const ALL: [Milestone; 4] = [
        Milestone::Quarter,
        Milestone::Half,
        Milestone::ThreeQuarters,
        Milestone::Complete,
    ];

    pub fn threshold(&self) -> f64 {
        match self {
            Milestone::Quarter => 0.25,
            Milestone::Half => 0.50,
            Milestone::ThreeQuarters => 0.75,
            Milestone::Complete => 1.0,
        }
    }

    pub fn percent(&self) -> u8 {
        (self.threshold() * 100.0) as u8
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// Thresholds that have already fired for one challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestoneSet(u8);

impl MilestoneSet {
    pub fn contains(&self, milestone: Milestone) -> bool {
        self.0 & milestone.bit() != 0
    }

    pub fn insert(&mut self, milestone: Milestone) {
        self.0 |= milestone.bit();
    }

    pub fn fired(&self) -> Vec<Milestone> {
        Milestone::ALL
            .into_iter()
            .filter(|m| self.contains(*m))
            .collect()
    }

    /// Record a progress move from `old` to `new` and return the milestone
    /// to announce, if any.
    ///
    /// Reaching 1.0 always announces [`Milestone::Complete`], even when lower
    /// thresholds were jumped over. Otherwise the lowest unfired threshold in
    /// `(old, new]` is announced. Every threshold at or below `new` is marked
    /// fired either way, so skipped thresholds never fire later.
    pub fn cross(&mut self, old: f64, new: f64) -> Option<Milestone> {
        if new <= old {
            return None;
        }

        let announce = if new >= 1.0 && !self.contains(Milestone::Complete) {
            Some(Milestone::Complete)
        } else {
            Milestone::ALL.into_iter().find(|m| {
                let t = m.threshold();
                !self.contains(*m) && old < t && t <= new
            })
        };

        for m in Milestone::ALL {
            if m.threshold() <= new {
                self.insert(m);
            }
        }
        announce
    }
}

/// Emitted (never persisted) when a challenge crosses a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneEvent {
    pub challenge_id: String,
    pub milestone: Milestone,
    /// Partial reward for intermediate thresholds, the full reward for
    /// [`Milestone::Complete`].
    pub reward: Reward,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_climb_fires_each_once_in_order() {
        let mut set = MilestoneSet::default();
        let steps = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
        let fired: Vec<_> = steps
            .windows(2)
            .filter_map(|w| set.cross(w[0], w[1]))
            .collect();
        assert_eq!(fired, Milestone::ALL.to_vec());
    }

    #[test]
    fn jump_to_full_fires_only_completion() {
        let mut set = MilestoneSet::default();
        assert_eq!(set.cross(0.1, 1.0), Some(Milestone::Complete));
        assert_eq!(set.fired().len(), 4);
        assert_eq!(set.cross(1.0, 1.0), None);
    }

    #[test]
    fn partial_jump_fires_lowest() {
        let mut set = MilestoneSet::default();
        assert_eq!(set.cross(0.1, 0.6), Some(Milestone::Quarter));
        assert!(set.contains(Milestone::Half));
        assert_eq!(set.cross(0.6, 0.7), None);
        assert_eq!(set.cross(0.7, 0.75), Some(Milestone::ThreeQuarters));
    }

    #[test]
    fn exact_threshold_is_inclusive() {
        let mut set = MilestoneSet::default();
        assert_eq!(set.cross(0.0, 0.25), Some(Milestone::Quarter));
        assert_eq!(set.cross(0.25, 0.25), None);
    }
}
