//! # SnapChef Challenges Core Library
//!
//! Deterministic, time-boxed cooking challenges for the SnapChef
//! fridge-to-recipe app. All operations are available through the
//! standalone `snapchef` CLI, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Catalog**: static challenge templates per cadence
//! - **Schedule**: pure `(cadence, day, year) -> Challenge` generation
//! - **Active set**: regenerates the trailing window and sweeps expiries
//! - **Progress**: typed event matching, milestones, timed sessions
//! - **Board**: the single-writer composition of the above
//! - **Service**: tokio task owning a board, with one tick source
//! - **Storage**: SQLite progress/completions and TOML configuration
//!
//! ## Key Components
//!
//! - [`ScheduleEngine`]: deterministic generation
//! - [`ChallengeBoard`]: synchronous core, every call takes `now`
//! - [`ChallengeService`]: async owner with mpsc commands
//! - [`ChallengeConfig`]: configuration management
//! - [`Database`]: progress and reward persistence

pub mod active;
pub mod board;
pub mod catalog;
pub mod challenge;
pub mod error;
pub mod events;
pub mod progress;
pub mod schedule;
pub mod service;
pub mod storage;

pub use active::ActiveSetMaintainer;
pub use board::{BoardSnapshot, ChallengeBoard, JoinOutcome, ParticipantRecord};
pub use catalog::TemplateCatalog;
pub use challenge::{
    Cadence, Challenge, ChallengeState, Difficulty, Milestone, MilestoneEvent, Requirement,
    RequirementKind, Reward, RewardPolicy,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::ChallengeEvent;
pub use progress::{ActionKind, ChallengeActionEvent, ProgressOutcome, ProgressTracker, TrackingSession};
pub use schedule::ScheduleEngine;
pub use service::{ChallengeService, Clock, ManualClock, ServiceHandle, SystemClock};
pub use storage::{ChallengeConfig, Database, SqliteSink};
