//! Outbound delivery of board events to persistence and notification
//! collaborators.
//!
//! Delivery happens after the board has finished its state change. A failing
//! collaborator is logged and skipped; it never feeds back into the board.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::challenge::{Challenge, MilestoneEvent, Reward};
use crate::error::Result;
use crate::events::ChallengeEvent;

/// Stores progress and completions.
///
/// Implementations may block; the dispatcher calls them off the owner task.
pub trait ProgressSink: Send + Sync {
    fn save_progress(
        &self,
        challenge_id: &str,
        progress: f64,
        metadata: &BTreeMap<String, serde_json::Value>,
        at: DateTime<Utc>,
    ) -> Result<()>;

    fn record_completion(&self, challenge: &Challenge, reward: Reward) -> Result<()>;
}

/// Participant-facing notifications. Every hook defaults to a no-op.
pub trait ChallengeNotifier: Send + Sync {
    fn on_milestone(&self, _event: &MilestoneEvent) {}

    fn on_completion(&self, _challenge: &Challenge, _reward: Reward) {}

    /// A joined challenge ran out of time.
    fn on_expired(&self, _challenge_id: &str, _progress: f64) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn save_progress(
        &self,
        _challenge_id: &str,
        _progress: f64,
        _metadata: &BTreeMap<String, serde_json::Value>,
        _at: DateTime<Utc>,
    ) -> Result<()> {
        Ok(())
    }

    fn record_completion(&self, _challenge: &Challenge, _reward: Reward) -> Result<()> {
        Ok(())
    }
}

/// Writes notifications to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl ChallengeNotifier for LogNotifier {
    fn on_milestone(&self, event: &MilestoneEvent) {
        info!(
            challenge = %event.challenge_id,
            percent = event.milestone.percent(),
            points = event.reward.points,
            "milestone reached"
        );
    }

    fn on_completion(&self, challenge: &Challenge, reward: Reward) {
        info!(challenge = %challenge.id, title = %challenge.title, points = reward.points, coins = reward.coins, "challenge complete");
    }

    fn on_expired(&self, challenge_id: &str, progress: f64) {
        info!(challenge = %challenge_id, progress, "challenge expired");
    }
}

/// Hand one event to the collaborators it concerns.
pub fn deliver(event: &ChallengeEvent, sink: &dyn ProgressSink, notifier: &dyn ChallengeNotifier) {
    match event {
        ChallengeEvent::ProgressUpdated {
            challenge_id,
            progress,
            metadata,
            at,
            ..
        } => {
            if let Err(e) = sink.save_progress(challenge_id, *progress, metadata, *at) {
                warn!(challenge = %challenge_id, error = %e, "failed to save progress");
            }
        }
        ChallengeEvent::MilestoneReached(milestone) => notifier.on_milestone(milestone),
        ChallengeEvent::Completed {
            challenge, reward, ..
        } => {
            if let Err(e) = sink.record_completion(challenge, *reward) {
                warn!(challenge = %challenge.id, error = %e, "failed to record completion");
            }
            notifier.on_completion(challenge, *reward);
        }
        ChallengeEvent::Expired {
            challenge_id,
            progress,
            ..
        } => notifier.on_expired(challenge_id, *progress),
        ChallengeEvent::Joined { .. }
        | ChallengeEvent::TrackingStarted { .. }
        | ChallengeEvent::TrackingStopped { .. }
        | ChallengeEvent::TimeCompleted { .. } => {}
    }
}

/// Ordered background delivery.
///
/// Batches are delivered one at a time, in submission order, each on the
/// blocking pool.
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Vec<ChallengeEvent>>,
    worker: JoinHandle<()>,
}

impl Dispatcher {
    pub fn spawn(sink: Arc<dyn ProgressSink>, notifier: Arc<dyn ChallengeNotifier>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<ChallengeEvent>>();
        let worker = tokio::spawn(async move {
            while let Some(batch) = rx.recv().await {
                let sink = Arc::clone(&sink);
                let notifier = Arc::clone(&notifier);
                let delivered = tokio::task::spawn_blocking(move || {
                    for event in &batch {
                        deliver(event, sink.as_ref(), notifier.as_ref());
                    }
                })
                .await;
                if let Err(e) = delivered {
                    warn!(error = %e, "event delivery task failed");
                }
            }
        });
        Self { tx, worker }
    }

    pub fn send(&self, batch: Vec<ChallengeEvent>) {
        if batch.is_empty() {
            return;
        }
        if self.tx.send(batch).is_err() {
            warn!("dispatcher stopped, dropping events");
        }
    }

    /// Deliver everything already queued, then stop.
    pub async fn flush(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            warn!(error = %e, "dispatcher worker failed");
        }
    }
}
