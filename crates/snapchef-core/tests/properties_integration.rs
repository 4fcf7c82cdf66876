//! Property tests for generation, the active window and progress.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use snapchef_core::{
    ActiveSetMaintainer, Cadence, ChallengeBoard, ChallengeConfig, ChallengeEvent, ChallengeState,
    Milestone, ScheduleEngine,
};

fn cadence() -> impl Strategy<Value = Cadence> {
    prop::sample::select(Cadence::ALL.to_vec())
}

/// Any instant between 2020 and 2030.
fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().timestamp();
    let end = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap().timestamp();
    (start..end).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generation_is_deterministic(cadence in cadence(), day in 0u32..800, year in 1970i32..2200) {
        let engine = ScheduleEngine::default();
        prop_assert_eq!(engine.generate(cadence, day, year), engine.generate(cadence, day, year));
    }

    #[test]
    fn generated_windows_are_well_formed(cadence in cadence(), day in 1u32..=366, year in 1970i32..2200) {
        if let Some(c) = ScheduleEngine::default().generate(cadence, day, year) {
            prop_assert!(c.ends_at > c.starts_at);
            prop_assert_eq!(c.ends_at - c.starts_at, c.difficulty.duration());
            prop_assert!(c.id.starts_with(cadence.as_str()));
            prop_assert!(c.goal.target >= 1);
            prop_assert!(c.completions <= c.participants);
        }
    }

    #[test]
    fn active_set_contains_only_open_challenges(now in instant()) {
        let mut active = ActiveSetMaintainer::new(ScheduleEngine::default(), 14, Duration::seconds(60));
        let set = active.recompute(now);
        for c in &set {
            prop_assert!(c.starts_at <= now && now < c.ends_at, "{} not open at {}", c.id, now);
            prop_assert!(!c.state.is_terminal());
        }
        for pair in set.windows(2) {
            prop_assert!((pair[0].ends_at, &pair[0].id) < (pair[1].ends_at, &pair[1].id));
        }
        // Everything generated today that is open gets published.
        let today = ScheduleEngine::default().generate_for_date(now.date_naive());
        for c in today.iter().filter(|c| c.contains(now)) {
            prop_assert!(set.iter().any(|a| a.id == c.id), "{} missing", c.id);
        }
    }

    #[test]
    fn progress_is_bounded_and_milestones_fire_once(day in 1u32..=366, entries in 1usize..30) {
        let c = ScheduleEngine::default().generate(Cadence::Weekly, day, 2024).unwrap();
        // Premium, so premium-only weeks can be joined too.
        let mut config = ChallengeConfig::default();
        config.rewards.premium = true;
        let mut board = ChallengeBoard::new(config).unwrap();
        board.start(c.starts_at);
        prop_assert!(board.join(&c.id, c.starts_at).is_joined());

        let mut last = 0.0;
        let mut events = Vec::new();
        for i in 0..entries {
            board.submit_entry(&c.id, c.starts_at + Duration::minutes(i as i64));
            let progress = board.get(&c.id).unwrap().progress;
            prop_assert!((0.0..=1.0).contains(&progress));
            prop_assert!(progress >= last);
            last = progress;
            events.extend(board.take_events());
        }

        for m in Milestone::ALL {
            let fired = events
                .iter()
                .filter(|e| matches!(e, ChallengeEvent::MilestoneReached(ev) if ev.milestone == m))
                .count();
            prop_assert!(fired <= 1, "{:?} fired {} times", m, fired);
        }
        let completions = events
            .iter()
            .filter(|e| matches!(e, ChallengeEvent::Completed { .. }))
            .count();
        let done = entries as u32 >= c.goal.target;
        prop_assert_eq!(completions, usize::from(done));
        prop_assert_eq!(
            board.get(&c.id).unwrap().state == ChallengeState::Completed,
            done
        );
    }
}
