pub mod challenges;
pub mod config;
pub mod event;
pub mod history;
pub mod stats;
pub mod track;
pub mod watch;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use snapchef_core::service::{deliver, LogNotifier};
use snapchef_core::{BoardSnapshot, ChallengeBoard, ChallengeConfig, ChallengeEvent, Database, SqliteSink};
use tracing::warn;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

const BOARD_KEY: &str = "challenge_board";

/// Board restored from the local database for one command.
pub struct Workspace {
    pub db: Database,
    pub board: ChallengeBoard,
}

impl Workspace {
    pub fn open(now: DateTime<Utc>) -> CliResult<Self> {
        let config = ChallengeConfig::load()?;
        let db = Database::open()?;
        let mut board = ChallengeBoard::new(config)?;
        match load_snapshot(&db) {
            Some(snapshot) => board.restore(snapshot, now),
            None => {
                board.start(now);
            }
        }
        Ok(Self { db, board })
    }

    /// Deliver queued board events, then persist participant state.
    /// Returns the delivered events.
    pub fn save(self) -> CliResult<Vec<ChallengeEvent>> {
        let Workspace { db, mut board } = self;
        let events = board.take_events();
        let sink = SqliteSink::new(db);
        for event in &events {
            deliver(event, &sink, &LogNotifier);
        }
        let db = sink.into_inner()?;
        save_snapshot(&db, &board.snapshot())?;
        Ok(events)
    }
}

fn load_snapshot(db: &Database) -> Option<BoardSnapshot> {
    let json = match db.kv_get(BOARD_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "failed to read saved board, starting fresh");
            return None;
        }
    };
    match serde_json::from_str::<BoardSnapshot>(&json) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(error = %e, "saved board is unreadable, starting fresh");
            None
        }
    }
}

pub fn save_snapshot(db: &Database, snapshot: &BoardSnapshot) -> CliResult {
    let json = serde_json::to_string(snapshot)?;
    db.kv_set(BOARD_KEY, &json)?;
    Ok(())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Wire name of a serde enum, e.g. `in_progress`.
pub fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

/// `2h 05m` style rendering of a remaining duration.
pub fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.num_minutes().max(0);
    let (days, hours, mins) = (minutes / 1440, minutes % 1440 / 60, minutes % 60);
    if days > 0 {
        format!("{days}d {hours:02}h")
    } else {
        format!("{hours}h {mins:02}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_formats() {
        assert_eq!(format_remaining(Duration::minutes(125)), "2h 05m");
        assert_eq!(format_remaining(Duration::hours(50)), "2d 02h");
        assert_eq!(format_remaining(Duration::minutes(-3)), "0h 00m");
    }

    #[test]
    fn unreadable_snapshot_starts_fresh() {
        let db = Database::open_memory().unwrap();
        assert!(load_snapshot(&db).is_none());
        db.kv_set(BOARD_KEY, "{not json").unwrap();
        assert!(load_snapshot(&db).is_none());

        save_snapshot(&db, &BoardSnapshot::default()).unwrap();
        assert_eq!(load_snapshot(&db), Some(BoardSnapshot::default()));
    }

    #[test]
    fn label_uses_wire_name() {
        assert_eq!(label(&snapchef_core::ChallengeState::InProgress), "in_progress");
    }
}
