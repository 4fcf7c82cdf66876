//! The async service under paused tokio time.

use chrono::Duration as ChronoDuration;
use snapchef_core::service::{ChallengeNotifier, ProgressSink};
use snapchef_core::{
    ActionKind, Cadence, Challenge, ChallengeActionEvent, ChallengeBoard, ChallengeConfig,
    ChallengeEvent, ChallengeService, ChallengeState, JoinOutcome, ManualClock, MilestoneEvent,
    RequirementKind, Reward, ScheduleEngine,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Recorder {
    progress: Mutex<Vec<(String, f64)>>,
    completions: Mutex<Vec<(String, Reward)>>,
    milestones: Mutex<Vec<u8>>,
}

impl ProgressSink for Recorder {
    fn save_progress(
        &self,
        challenge_id: &str,
        progress: f64,
        _metadata: &BTreeMap<String, serde_json::Value>,
        _at: chrono::DateTime<chrono::Utc>,
    ) -> snapchef_core::error::Result<()> {
        self.progress
            .lock()
            .unwrap()
            .push((challenge_id.to_string(), progress));
        Ok(())
    }

    fn record_completion(&self, challenge: &Challenge, reward: Reward) -> snapchef_core::error::Result<()> {
        self.completions
            .lock()
            .unwrap()
            .push((challenge.id.clone(), reward));
        Ok(())
    }
}

impl ChallengeNotifier for Recorder {
    fn on_milestone(&self, event: &MilestoneEvent) {
        self.milestones.lock().unwrap().push(event.milestone.percent());
    }
}

fn timed_daily() -> Challenge {
    let engine = ScheduleEngine::default();
    (1..=366)
        .filter_map(|day| engine.generate(Cadence::Daily, day, 2024))
        .find(|c| c.goal.kind == RequirementKind::Timed)
        .expect("a timed daily challenge")
}

#[tokio::test(start_paused = true)]
async fn test_ticker_completes_timed_session() {
    let challenge = timed_daily();
    let clock = ManualClock::new(challenge.starts_at);
    let recorder = Arc::new(Recorder::default());
    let board = ChallengeBoard::new(ChallengeConfig::default()).unwrap();
    let handle = ChallengeService::new(board, Arc::new(clock.clone()))
        .with_sink(recorder.clone())
        .with_notifier(recorder.clone())
        .spawn();
    let mut events = handle.subscribe();

    assert_eq!(handle.join(&challenge.id).await.unwrap(), JoinOutcome::Joined);
    assert!(!handle.start_tracking(&challenge.id).await.unwrap());

    clock.advance(ChronoDuration::minutes(challenge.goal.target as i64));
    tokio::time::sleep(Duration::from_secs(3)).await;

    let current = handle.get(&challenge.id).await.unwrap().unwrap();
    assert_eq!(current.state, ChallengeState::Completed);

    let snapshot = handle.shutdown().await.unwrap();
    let record = snapshot
        .records
        .iter()
        .find(|r| r.id == challenge.id)
        .unwrap();
    assert_eq!(record.state, ChallengeState::Completed);
    assert!(snapshot.sessions.is_empty());

    // Shutdown flushed every delivery.
    assert_eq!(
        *recorder.completions.lock().unwrap(),
        vec![(challenge.id.clone(), challenge.reward)]
    );
    assert_eq!(*recorder.milestones.lock().unwrap(), vec![100]);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(matches!(seen.first(), Some(ChallengeEvent::Joined { .. })));
    assert!(seen
        .iter()
        .any(|e| matches!(e, ChallengeEvent::TrackingStarted { .. })));
    assert!(seen
        .iter()
        .any(|e| matches!(e, ChallengeEvent::TimeCompleted { .. })));
    assert!(matches!(seen.last(), Some(ChallengeEvent::Completed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_submissions_are_linearised_with_ticks() {
    let challenge = ScheduleEngine::default()
        .generate(Cadence::Daily, 45, 2024)
        .unwrap();
    let clock = ManualClock::new(challenge.starts_at);
    let recorder = Arc::new(Recorder::default());
    let board = ChallengeBoard::new(ChallengeConfig::default()).unwrap();
    let handle = ChallengeService::new(board, Arc::new(clock.clone()))
        .with_sink(recorder.clone())
        .spawn();

    handle.join(&challenge.id).await.unwrap();
    let target = challenge.goal.target;
    for minute in 0..target {
        let at = challenge.starts_at + ChronoDuration::minutes(minute as i64);
        handle
            .submit(ChallengeActionEvent::new(ActionKind::IngredientsScanned, at))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
    }
    assert_eq!(handle.history(100).await.unwrap().len(), target as usize);

    let other = handle.clone();
    handle.shutdown().await.unwrap();
    assert!(other.active().await.is_err());

    let progress = recorder.progress.lock().unwrap();
    assert_eq!(progress.len(), target as usize);
    assert_eq!(progress.last().map(|(_, p)| *p), Some(1.0));
    assert_eq!(recorder.completions.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_expiry_reaches_subscribers() {
    let challenge = ScheduleEngine::default()
        .generate(Cadence::Daily, 45, 2024)
        .unwrap();
    let clock = ManualClock::new(challenge.starts_at);
    let board = ChallengeBoard::new(ChallengeConfig::default()).unwrap();
    let handle = ChallengeService::new(board, Arc::new(clock.clone())).spawn();
    let mut events = handle.subscribe();

    handle.join(&challenge.id).await.unwrap();
    clock.set(challenge.ends_at);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let mut expired = false;
    while let Ok(event) = events.try_recv() {
        if let ChallengeEvent::Expired { challenge_id, .. } = event {
            expired |= challenge_id == challenge.id;
        }
    }
    assert!(expired);
    assert!(handle
        .active()
        .await
        .unwrap()
        .iter()
        .all(|c| c.id != challenge.id));
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_restored_expiry_reaches_first_subscriber() {
    let challenge = ScheduleEngine::default()
        .generate(Cadence::Daily, 45, 2024)
        .unwrap();
    let mut earlier = ChallengeBoard::new(ChallengeConfig::default()).unwrap();
    earlier.start(challenge.starts_at);
    assert_eq!(earlier.join(&challenge.id, challenge.starts_at), JoinOutcome::Joined);
    let snapshot = earlier.snapshot();

    let later = challenge.ends_at + ChronoDuration::days(20);
    let mut board = ChallengeBoard::new(ChallengeConfig::default()).unwrap();
    board.restore(snapshot, later);
    let (handle, mut events) =
        ChallengeService::new(board, Arc::new(ManualClock::new(later))).spawn_with_events();
    handle.shutdown().await.unwrap();

    let mut expired = false;
    while let Ok(event) = events.try_recv() {
        if let ChallengeEvent::Expired { challenge_id, .. } = event {
            expired |= challenge_id == challenge.id;
        }
    }
    assert!(expired);
}
