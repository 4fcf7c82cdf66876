use chrono::Utc;
use serde::Serialize;
use snapchef_core::ChallengeState;

use super::{print_json, CliResult, Workspace};

#[derive(Serialize)]
struct Summary {
    completed: u64,
    points: u64,
    coins: u64,
    active: usize,
    joined: usize,
    in_progress: usize,
}

pub fn run() -> CliResult {
    let ws = Workspace::open(Utc::now())?;
    let totals = ws.db.total_rewards()?;
    let joined = ws.board.joined();
    let summary = Summary {
        completed: totals.completed,
        points: totals.points,
        coins: totals.coins,
        active: ws.board.active().len(),
        joined: joined.len(),
        in_progress: joined
            .iter()
            .filter(|c| c.state == ChallengeState::InProgress)
            .count(),
    };
    print_json(&summary)
}
