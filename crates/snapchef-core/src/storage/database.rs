//! SQLite-based progress storage and reward totals.
//!
//! Provides persistent storage for:
//! - Last known progress per challenge
//! - Completed challenges with the reward actually awarded
//! - Key-value store for board snapshots

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use super::data_dir;
use crate::challenge::{Challenge, Reward};
use crate::error::{CoreError, DatabaseError, Result};
use crate::service::ProgressSink;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub challenge_id: String,
    pub title: String,
    pub cadence: String,
    pub points: u32,
    pub coins: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Totals {
    pub completed: u64,
    pub points: u64,
    pub coins: u64,
}

/// SQLite database for challenge progress.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/snapchef/snapchef.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("snapchef.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS progress (
                challenge_id TEXT PRIMARY KEY,
                progress     REAL NOT NULL,
                metadata     TEXT NOT NULL DEFAULT '{}',
                updated_at   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS completions (
                challenge_id TEXT PRIMARY KEY,
                title        TEXT NOT NULL,
                cadence      TEXT NOT NULL,
                points       INTEGER NOT NULL,
                coins        INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_completions_completed_at ON completions(completed_at);",
        )?;
        Ok(())
    }

    /// Upsert the latest progress for a challenge.
    pub fn save_progress(
        &self,
        challenge_id: &str,
        progress: f64,
        metadata: &BTreeMap<String, serde_json::Value>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let metadata = serde_json::to_string(metadata)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO progress (challenge_id, progress, metadata, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![challenge_id, progress, metadata, at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn progress_for(&self, challenge_id: &str) -> Result<Option<f64>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT progress FROM progress WHERE challenge_id = ?1",
                params![challenge_id],
                |row| row.get::<_, f64>(0),
            )
            .optional()
    }

    /// Record a completion. A second record for the same challenge is
    /// ignored; returns whether a row was written.
    pub fn record_completion(
        &self,
        challenge: &Challenge,
        reward: Reward,
    ) -> Result<bool, rusqlite::Error> {
        let completed_at = challenge.completed_at.unwrap_or(challenge.ends_at);
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO completions
                (challenge_id, title, cadence, points, coins, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                challenge.id,
                challenge.title,
                challenge.cadence.as_str(),
                reward.points,
                reward.coins,
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Most recent completions first.
    pub fn completions(&self, limit: usize) -> Result<Vec<CompletionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT challenge_id, title, cadence, points, coins, completed_at
             FROM completions
             ORDER BY completed_at DESC, challenge_id
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit.min(i64::MAX as usize) as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (challenge_id, title, cadence, points, coins, completed_at) = row?;
            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map_err(|e| CoreError::from(DatabaseError::QueryFailed(e.to_string())))?
                .with_timezone(&Utc);
            records.push(CompletionRecord {
                challenge_id,
                title,
                cadence,
                points,
                coins,
                completed_at,
            });
        }
        Ok(records)
    }

    pub fn total_rewards(&self) -> Result<Totals, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(points), 0), COALESCE(SUM(coins), 0) FROM completions",
            [],
            |row| {
                Ok(Totals {
                    completed: row.get(0)?,
                    points: row.get(1)?,
                    coins: row.get(2)?,
                })
            },
        )
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// [`ProgressSink`] backed by a [`Database`].
pub struct SqliteSink {
    db: Mutex<Database>,
}

impl SqliteSink {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let db = self.db.lock().map_err(|_| DatabaseError::Locked)?;
        f(&db)
    }

    pub fn into_inner(self) -> Result<Database> {
        self.db
            .into_inner()
            .map_err(|_| CoreError::from(DatabaseError::Locked))
    }
}

impl ProgressSink for SqliteSink {
    fn save_progress(
        &self,
        challenge_id: &str,
        progress: f64,
        metadata: &BTreeMap<String, serde_json::Value>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_db(|db| db.save_progress(challenge_id, progress, metadata, at))
    }

    fn record_completion(&self, challenge: &Challenge, reward: Reward) -> Result<()> {
        self.with_db(|db| {
            db.record_completion(challenge, reward)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::Cadence;
    use crate::schedule::ScheduleEngine;

    fn completed(day: u32) -> Challenge {
        let mut c = ScheduleEngine::default()
            .generate(Cadence::Daily, day, 2024)
            .unwrap();
        c.completed_at = Some(c.starts_at + chrono::Duration::hours(1));
        c
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn progress_upserts() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        assert!(db.progress_for("daily-45-2024").unwrap().is_none());
        db.save_progress("daily-45-2024", 0.25, &BTreeMap::new(), now)
            .unwrap();
        db.save_progress("daily-45-2024", 0.5, &BTreeMap::new(), now)
            .unwrap();
        assert_eq!(db.progress_for("daily-45-2024").unwrap(), Some(0.5));
    }

    #[test]
    fn completion_is_recorded_once() {
        let db = Database::open_memory().unwrap();
        let c = completed(45);
        assert!(db.record_completion(&c, Reward::new(100, 10)).unwrap());
        assert!(!db.record_completion(&c, Reward::new(100, 10)).unwrap());
        db.record_completion(&completed(46), Reward::new(50, 5))
            .unwrap();

        let totals = db.total_rewards().unwrap();
        assert_eq!(
            totals,
            Totals {
                completed: 2,
                points: 150,
                coins: 15
            }
        );

        let recent = db.completions(10).unwrap();
        assert_eq!(recent[0].challenge_id, "daily-46-2024");
        assert_eq!(recent[1].points, 100);
    }

    #[test]
    fn sink_writes_through() {
        let sink = SqliteSink::new(Database::open_memory().unwrap());
        let c = completed(45);
        sink.save_progress(&c.id, 1.0, &BTreeMap::new(), Utc::now())
            .unwrap();
        sink.record_completion(&c, Reward::new(10, 1)).unwrap();

        let db = sink.into_inner().unwrap();
        assert_eq!(db.progress_for(&c.id).unwrap(), Some(1.0));
        assert_eq!(db.total_rewards().unwrap().completed, 1);
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapchef.db");
        Database::open_at(&path).unwrap().kv_set("k", "v").unwrap();
        assert_eq!(
            Database::open_at(&path).unwrap().kv_get("k").unwrap().as_deref(),
            Some("v")
        );
    }
}
