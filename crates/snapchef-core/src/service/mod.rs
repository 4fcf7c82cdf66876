//! Async owner of a [`ChallengeBoard`].
//!
//! One tokio task owns the board. Commands arrive over an mpsc channel with
//! oneshot replies and share a `select!` loop with the periodic ticker, so
//! ticks and participant actions are applied one at a time, in arrival
//! order. Board events are broadcast to subscribers and handed to the
//! [`Dispatcher`] after each step.

mod clock;
mod dispatch;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatch::{deliver, ChallengeNotifier, Dispatcher, LogNotifier, NoopSink, ProgressSink};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::board::{BoardSnapshot, ChallengeBoard, JoinOutcome};
use crate::challenge::Challenge;
use crate::error::Result;
use crate::events::ChallengeEvent;
use crate::progress::{ChallengeActionEvent, ProgressOutcome};

/// Default cadence of the single tick source. Fine enough for minute-based
/// timed sessions; the active-set recompute runs on its own, coarser
/// interval inside [`ChallengeBoard::tick`].
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 256;

enum Command {
    Active(oneshot::Sender<Vec<Challenge>>),
    Get(String, oneshot::Sender<Option<Challenge>>),
    Join(String, oneshot::Sender<JoinOutcome>),
    Submit(ChallengeActionEvent, oneshot::Sender<usize>),
    SubmitEntry(String, oneshot::Sender<ProgressOutcome>),
    StartTracking(String, oneshot::Sender<bool>),
    StopTracking(String, oneshot::Sender<()>),
    History(usize, oneshot::Sender<Vec<ChallengeActionEvent>>),
    Recompute(oneshot::Sender<Vec<Challenge>>),
    Snapshot(oneshot::Sender<BoardSnapshot>),
    Shutdown(oneshot::Sender<BoardSnapshot>),
}

pub struct ChallengeService {
    board: ChallengeBoard,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ProgressSink>,
    notifier: Arc<dyn ChallengeNotifier>,
    tick_interval: Duration,
}

impl ChallengeService {
    pub fn new(board: ChallengeBoard, clock: Arc<dyn Clock>) -> Self {
        Self {
            board,
            clock,
            sink: Arc::new(NoopSink),
            notifier: Arc::new(LogNotifier),
            tick_interval: TICK_INTERVAL,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ChallengeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Start the owner task. Must be called inside a tokio runtime.
    pub fn spawn(self) -> ServiceHandle {
        self.spawn_with_events().0
    }

    /// Like [`spawn`](Self::spawn), but also returns a receiver subscribed
    /// before the task starts, so events queued on the board before the
    /// service started (expiries found by a restore) are not missed.
    pub fn spawn_with_events(self) -> (ServiceHandle, broadcast::Receiver<ChallengeEvent>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let (events, subscriber) = broadcast::channel(EVENT_BUFFER);
        let worker = tokio::spawn(self.run(rx, events.clone()));
        let handle = ServiceHandle {
            tx,
            events,
            worker: Arc::new(worker),
        };
        (handle, subscriber)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>, events: broadcast::Sender<ChallengeEvent>) {
        let dispatcher = Dispatcher::spawn(Arc::clone(&self.sink), Arc::clone(&self.notifier));
        let now = self.clock.now();
        let active = self.board.start(now).len();
        info!(active, "challenge service started");
        self.publish(&dispatcher, &events);

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut pending_shutdown = Vec::new();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.board.tick(self.clock.now());
                }
                command = rx.recv() => match command {
                    Some(Command::Shutdown(reply)) => {
                        pending_shutdown.push(reply);
                        break;
                    }
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
            self.publish(&dispatcher, &events);
        }

        // Stop ticking, then serve what is already queued.
        drop(ticker);
        rx.close();
        while let Some(command) = rx.recv().await {
            match command {
                Command::Shutdown(reply) => pending_shutdown.push(reply),
                command => self.handle(command),
            }
            self.publish(&dispatcher, &events);
        }

        dispatcher.flush().await;
        let snapshot = self.board.snapshot();
        for reply in pending_shutdown {
            let _ = reply.send(snapshot.clone());
        }
        info!("challenge service stopped");
    }

    fn handle(&mut self, command: Command) {
        let now = self.clock.now();
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            Command::Active(reply) => {
                let _ = reply.send(self.board.active().into_iter().cloned().collect());
            }
            Command::Get(id, reply) => {
                let _ = reply.send(self.board.get(&id).cloned());
            }
            Command::Join(id, reply) => {
                let _ = reply.send(self.board.join(&id, now));
            }
            Command::Submit(event, reply) => {
                let _ = reply.send(self.board.submit(event));
            }
            Command::SubmitEntry(id, reply) => {
                let _ = reply.send(self.board.submit_entry(&id, now));
            }
            Command::StartTracking(id, reply) => {
                let _ = reply.send(self.board.start_tracking(&id, now));
            }
            Command::StopTracking(id, reply) => {
                self.board.stop_tracking(&id, now);
                let _ = reply.send(());
            }
            Command::History(limit, reply) => {
                let _ = reply.send(self.board.history(limit));
            }
            Command::Recompute(reply) => {
                let _ = reply.send(self.board.recompute(now).into_iter().cloned().collect());
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.board.snapshot());
            }
            Command::Shutdown(reply) => {
                let _ = reply.send(self.board.snapshot());
            }
        }
    }

    fn publish(&mut self, dispatcher: &Dispatcher, events: &broadcast::Sender<ChallengeEvent>) {
        let batch = self.board.take_events();
        if batch.is_empty() {
            return;
        }
        debug!(count = batch.len(), "publishing board events");
        for event in &batch {
            // No subscribers is fine.
            let _ = events.send(event.clone());
        }
        dispatcher.send(batch);
    }
}

/// Cloneable client for a running [`ChallengeService`].
#[derive(Clone)]
pub struct ServiceHandle {
    tx: mpsc::Sender<Command>,
    events: broadcast::Sender<ChallengeEvent>,
    worker: Arc<JoinHandle<()>>,
}

impl ServiceHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).await?;
        Ok(rx.await?)
    }

    /// Board events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChallengeEvent> {
        self.events.subscribe()
    }

    pub async fn active(&self) -> Result<Vec<Challenge>> {
        self.request(Command::Active).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Challenge>> {
        self.request(|reply| Command::Get(id.to_string(), reply)).await
    }

    pub async fn join(&self, id: &str) -> Result<JoinOutcome> {
        self.request(|reply| Command::Join(id.to_string(), reply)).await
    }

    pub async fn submit(&self, event: ChallengeActionEvent) -> Result<usize> {
        self.request(|reply| Command::Submit(event, reply)).await
    }

    pub async fn submit_entry(&self, id: &str) -> Result<ProgressOutcome> {
        self.request(|reply| Command::SubmitEntry(id.to_string(), reply))
            .await
    }

    pub async fn start_tracking(&self, id: &str) -> Result<bool> {
        self.request(|reply| Command::StartTracking(id.to_string(), reply))
            .await
    }

    pub async fn stop_tracking(&self, id: &str) -> Result<()> {
        self.request(|reply| Command::StopTracking(id.to_string(), reply))
            .await
    }

    pub async fn history(&self, limit: usize) -> Result<Vec<ChallengeActionEvent>> {
        self.request(|reply| Command::History(limit, reply)).await
    }

    pub async fn recompute(&self) -> Result<Vec<Challenge>> {
        self.request(Command::Recompute).await
    }

    pub async fn snapshot(&self) -> Result<BoardSnapshot> {
        self.request(Command::Snapshot).await
    }

    /// Stop the ticker, serve queued commands, flush pending deliveries and
    /// return the final participant state.
    pub async fn shutdown(self) -> Result<BoardSnapshot> {
        self.request(Command::Shutdown).await
    }

    pub fn is_running(&self) -> bool {
        !self.worker.is_finished()
    }
}
