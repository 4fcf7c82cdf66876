//! The live set of challenges.
//!
//! Schedule data is never stored: every refresh regenerates the trailing
//! window from the [`ScheduleEngine`]. Records are kept between refreshes
//! only so that participant state (join, units, milestones) survives; a
//! record is dropped once its generation day leaves the window, except a
//! joined record, which stays until it has been swept to `Expired`.
//!
//! The window never moves backwards: a refresh at an instant earlier than
//! the previous one is clamped to the previous instant.

use chrono::{DateTime, Days, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::challenge::{Challenge, Transition};
use crate::schedule::ScheduleEngine;

/// Default trailing window, long enough to cover the longest (master,
/// 14-day) challenge.
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

/// Owns every in-window challenge record and the published active view.
#[derive(Debug, Clone)]
pub struct ActiveSetMaintainer {
    engine: ScheduleEngine,
    window_days: u32,
    interval: Duration,
    records: HashMap<String, Challenge>,
    /// Active ids, ascending by end time then id.
    published: Vec<String>,
    last_refresh: Option<DateTime<Utc>>,
}

impl ActiveSetMaintainer {
    pub fn new(engine: ScheduleEngine, window_days: u32, interval: Duration) -> Self {
        Self {
            engine,
            window_days,
            interval,
            records: HashMap::new(),
            published: Vec::new(),
            last_refresh: None,
        }
    }

    /// Refresh and return the active set, ascending by end time.
    pub fn recompute(&mut self, now: DateTime<Utc>) -> Vec<&Challenge> {
        self.refresh(now);
        self.active()
    }

    /// Regenerate the window, expire overdue records and republish.
    ///
    /// Returns the ids of joined challenges that expired during this pass.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let now = match self.last_refresh {
            Some(last) if now < last => {
                warn!(%now, %last, "refresh requested in the past, clamping");
                last
            }
            _ => now,
        };
        self.regenerate(now);
        let expired = self.sweep(now);
        self.publish(now);
        self.last_refresh = Some(now);
        debug!(
            records = self.records.len(),
            active = self.published.len(),
            expired = expired.len(),
            "active set refreshed"
        );
        expired
    }

    fn regenerate(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        let mut generated: BTreeMap<String, Challenge> = BTreeMap::new();

        for offset in 0..=self.window_days {
            let Some(date) = today.checked_sub_days(Days::new(offset as u64)) else {
                warn!(offset, "skipping unrepresentable generation date");
                continue;
            };
            for challenge in self.engine.generate_for_date(date) {
                if challenge.ends_at <= challenge.starts_at {
                    warn!(id = %challenge.id, "skipping challenge with empty window");
                    continue;
                }
                generated.entry(challenge.id.clone()).or_insert(challenge);
            }
        }

        self.records
            .retain(|id, c| generated.contains_key(id) || c.is_tracking());
        for (id, challenge) in generated {
            self.records.entry(id).or_insert(challenge);
        }
    }

    /// Expire every open record whose window has closed.
    fn sweep(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut expired: Vec<String> = self
            .records
            .values_mut()
            .filter(|c| now >= c.ends_at)
            .filter_map(|c| expire(c).then(|| c.id.clone()))
            .collect();
        expired.sort();
        expired
    }

    fn publish(&mut self, now: DateTime<Utc>) {
        let mut active: Vec<&Challenge> =
            self.records.values().filter(|c| c.is_active(now)).collect();
        sort_by_deadline(&mut active);
        self.published = active.into_iter().map(|c| c.id.clone()).collect();
    }

    /// Expire a single record if its window has closed. Returns `true` if
    /// it was joined and just expired.
    pub(crate) fn expire_if_due(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        match self.records.get_mut(id) {
            Some(c) if now >= c.ends_at => expire(c),
            _ => false,
        }
    }

    /// The published active set as of the last refresh.
    pub fn active(&self) -> Vec<&Challenge> {
        self.published
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|c| !c.state.is_terminal())
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Challenge> {
        self.records.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Challenge> {
        self.records.get_mut(id)
    }

    /// Joined, open records whose window contains `at`, in deadline order.
    pub(crate) fn tracking_ids(&self, at: DateTime<Utc>) -> Vec<String> {
        let mut tracking: Vec<&Challenge> = self
            .records
            .values()
            .filter(|c| c.is_tracking() && c.contains(at))
            .collect();
        sort_by_deadline(&mut tracking);
        tracking.into_iter().map(|c| c.id.clone()).collect()
    }

    /// Every retained record, including terminal and not-yet-open ones.
    pub fn records(&self) -> impl Iterator<Item = &Challenge> {
        self.records.values()
    }

    /// Whether the periodic refresh is due at `now`.
    pub fn due(&self, now: DateTime<Utc>) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => now >= last + self.interval,
        }
    }

    /// Instant of the last refresh, after clamping.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    pub fn next_refresh_at(&self) -> Option<DateTime<Utc>> {
        self.last_refresh.map(|last| last + self.interval)
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }
}

fn expire(challenge: &mut Challenge) -> bool {
    let was_joined = challenge.is_tracking();
    challenge.state.apply(Transition::Expire) && was_joined
}

fn sort_by_deadline(challenges: &mut [&Challenge]) {
    challenges.sort_by(|a, b| a.ends_at.cmp(&b.ends_at).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::{Cadence, ChallengeState};
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn maintainer() -> ActiveSetMaintainer {
        ActiveSetMaintainer::new(
            ScheduleEngine::default(),
            DEFAULT_WINDOW_DAYS,
            Duration::seconds(60),
        )
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn active_set_is_sorted_and_unique() {
        let mut m = maintainer();
        let now = at(2024, 2, 14, 12);
        let active = m.recompute(now);
        assert!(!active.is_empty());

        let ids: HashSet<&str> = active.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), active.len());

        for pair in active.windows(2) {
            assert!(
                (pair[0].ends_at, &pair[0].id) <= (pair[1].ends_at, &pair[1].id),
                "not sorted"
            );
        }
        for c in &active {
            assert!(c.starts_at <= now && now < c.ends_at);
        }
    }

    #[test]
    fn window_contains_every_open_generated_challenge() {
        let mut m = maintainer();
        let now = at(2024, 3, 25, 6);
        let active: HashSet<String> = m.recompute(now).iter().map(|c| c.id.clone()).collect();

        let engine = ScheduleEngine::default();
        let mut expected = HashSet::new();
        for back in 0..=DEFAULT_WINDOW_DAYS as u64 {
            let date = now.date_naive().checked_sub_days(Days::new(back)).unwrap();
            for c in engine.generate_for_date(date) {
                if c.contains(now) {
                    expected.insert(c.id);
                }
            }
        }
        assert_eq!(active, expected);
        // Seasonal run anchored on day 79 is still open on day 85.
        assert!(active.contains("seasonal-79-2024"));
    }

    #[test]
    fn end_instant_is_excluded() {
        let mut m = maintainer();
        let c = ScheduleEngine::default()
            .generate(Cadence::Daily, 45, 2024)
            .unwrap();

        let before: Vec<String> = m.recompute(c.ends_at - Duration::seconds(1))
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert!(before.contains(&c.id));

        let at_end: Vec<String> = m.recompute(c.ends_at).iter().map(|c| c.id.clone()).collect();
        assert!(!at_end.contains(&c.id));
        assert_eq!(m.get(&c.id).unwrap().state, ChallengeState::Expired);
    }

    #[test]
    fn joined_expiry_is_reported_once() {
        let mut m = maintainer();
        let c = ScheduleEngine::default()
            .generate(Cadence::Daily, 45, 2024)
            .unwrap();
        m.refresh(c.starts_at);
        m.get_mut(&c.id).unwrap().state.apply(Transition::Join);

        assert_eq!(m.refresh(c.ends_at), vec![c.id.clone()]);
        assert!(m.refresh(c.ends_at + Duration::minutes(1)).is_empty());
    }

    #[test]
    fn records_leave_with_the_window() {
        let mut m = maintainer();
        let c = ScheduleEngine::default()
            .generate(Cadence::Daily, 45, 2024)
            .unwrap();
        m.refresh(c.starts_at);
        assert!(m.get(&c.id).is_some());
        m.refresh(c.starts_at + Duration::days(DEFAULT_WINDOW_DAYS as i64 + 1));
        assert!(m.get(&c.id).is_none());
    }

    #[test]
    fn participant_state_survives_refresh() {
        let mut m = maintainer();
        let c = ScheduleEngine::default()
            .generate(Cadence::Daily, 45, 2024)
            .unwrap();
        m.refresh(c.starts_at);
        m.get_mut(&c.id).unwrap().state.apply(Transition::Join);
        m.refresh(c.starts_at + Duration::hours(1));
        assert_eq!(m.get(&c.id).unwrap().state, ChallengeState::Joined);
    }

    #[test]
    fn due_after_interval() {
        let mut m = maintainer();
        let now = at(2024, 2, 14, 12);
        assert!(m.due(now));
        m.refresh(now);
        assert!(!m.due(now + Duration::seconds(59)));
        assert!(m.due(now + Duration::seconds(60)));
        assert!(!m.due(now - Duration::seconds(1)));
    }

    #[test]
    fn refresh_in_the_past_keeps_later_records() {
        let mut m = maintainer();
        let c = ScheduleEngine::default()
            .generate(Cadence::Daily, 46, 2024)
            .unwrap();
        m.refresh(c.starts_at);
        m.get_mut(&c.id).unwrap().state.apply(Transition::Join);

        m.refresh(c.starts_at - Duration::days(1));
        assert_eq!(m.get(&c.id).unwrap().state, ChallengeState::Joined);
        assert_eq!(m.last_refresh(), Some(c.starts_at));
    }

    #[test]
    fn joined_record_expires_before_leaving_the_window() {
        let mut m = maintainer();
        let c = ScheduleEngine::default()
            .generate(Cadence::Daily, 45, 2024)
            .unwrap();
        m.refresh(c.starts_at);
        m.get_mut(&c.id).unwrap().state.apply(Transition::Join);

        let later = c.ends_at + Duration::days(20);
        assert_eq!(m.refresh(later), vec![c.id.clone()]);
        assert_eq!(m.get(&c.id).unwrap().state, ChallengeState::Expired);

        m.refresh(later + Duration::minutes(1));
        assert!(m.get(&c.id).is_none());
    }
}
