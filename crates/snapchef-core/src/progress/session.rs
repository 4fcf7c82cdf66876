//! Per-challenge timing for timed goals.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Transient timing context for one timed challenge.
///
/// Lives from join (or an explicit start) until completion or stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingSession {
    pub challenge_id: String,
    pub started_at: DateTime<Utc>,
    pub target_minutes: u32,
    /// Whole minutes observed at the last tick.
    pub elapsed_minutes: u32,
    /// The target crossing has already been reported.
    pub fired: bool,
}

impl TrackingSession {
    pub fn new(challenge_id: impl Into<String>, started_at: DateTime<Utc>, target_minutes: u32) -> Self {
        Self {
            challenge_id: challenge_id.into(),
            started_at,
            target_minutes: target_minutes.max(1),
            elapsed_minutes: 0,
            fired: false,
        }
    }

    /// Elapsed time, clamped at zero when `now` precedes the start.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + Duration::seconds(self.target_minutes as i64 * 60)
    }

    /// Update the elapsed count. Returns `true` exactly once, on the tick
    /// where elapsed time first reaches the target.
    pub fn advance(&mut self, now: DateTime<Utc>) -> bool {
        let elapsed = self.elapsed(now);
        self.elapsed_minutes = elapsed.num_minutes().clamp(0, u32::MAX as i64) as u32;
        if self.fired || elapsed.num_seconds() < self.target_minutes as i64 * 60 {
            return false;
        }
        self.fired = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn fires_once_at_target() {
        let mut s = TrackingSession::new("daily-45-2024", start(), 15);
        assert!(!s.advance(start() + Duration::minutes(14)));
        assert_eq!(s.elapsed_minutes, 14);
        assert!(s.advance(start() + Duration::minutes(15)));
        assert!(!s.advance(start() + Duration::minutes(30)));
        assert_eq!(s.elapsed_minutes, 30);
    }

    #[test]
    fn clock_skew_clamps_to_zero() {
        let mut s = TrackingSession::new("x", start(), 1);
        assert!(!s.advance(start() - Duration::hours(1)));
        assert_eq!(s.elapsed_minutes, 0);
        assert_eq!(s.elapsed(start() - Duration::hours(1)), Duration::zero());
    }

    #[test]
    fn deadline_is_target_minutes_after_start() {
        let s = TrackingSession::new("x", start(), 90);
        assert_eq!(s.deadline(), start() + Duration::minutes(90));
    }
}
