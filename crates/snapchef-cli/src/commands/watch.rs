use chrono::Utc;
use snapchef_core::{ChallengeService, Database, SqliteSink, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::{save_snapshot, CliResult, Workspace};

/// Run the live service for `seconds`, printing every board event as one
/// JSON line, then persist the final participant state.
pub fn run(seconds: u64) -> CliResult {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(seconds))
}

async fn watch(seconds: u64) -> CliResult {
    let Workspace { db, board } = Workspace::open(Utc::now())?;
    let (handle, mut events) = ChallengeService::new(board, Arc::new(SystemClock))
        .with_sink(Arc::new(SqliteSink::new(db)))
        .spawn_with_events();

    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            received = events.recv() => match received {
                Ok(event) => println!("{}", serde_json::to_string(&event)?),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    let snapshot = handle.shutdown().await?;
    save_snapshot(&Database::open()?, &snapshot)?;
    Ok(())
}
