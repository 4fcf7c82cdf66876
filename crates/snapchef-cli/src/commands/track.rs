use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum TrackAction {
    /// Start a session for a joined timed challenge
    Start {
        /// Challenge ID
        id: String,
    },
    /// Abandon the session without credit
    Stop {
        /// Challenge ID
        id: String,
    },
    /// Advance sessions to the current time and credit finished ones
    Tick,
    /// Print open sessions as JSON
    Status,
}

pub fn run(action: TrackAction) -> CliResult {
    let now = Utc::now();
    let mut ws = Workspace::open(now)?;
    match action {
        TrackAction::Start { id } => {
            if !ws.board.start_tracking(&id, now) {
                return Err(format!("no timed session can start for {id}").into());
            }
            ws.save()?;
            println!("Tracking {id}");
        }
        TrackAction::Stop { id } => {
            if ws.board.session(&id).is_none() {
                return Err(format!("no open session for {id}").into());
            }
            ws.board.stop_tracking(&id, now);
            ws.save()?;
            println!("Stopped {id}");
        }
        TrackAction::Tick => {
            ws.board.tick(now);
            let events = ws.save()?;
            print_json(&events)?;
        }
        TrackAction::Status => {
            let sessions: Vec<_> = ws
                .board
                .snapshot()
                .sessions
                .into_iter()
                .map(|s| {
                    json!({
                        "challenge_id": s.challenge_id,
                        "started_at": s.started_at,
                        "target_minutes": s.target_minutes,
                        "elapsed_minutes": s.elapsed(now).num_minutes(),
                    })
                })
                .collect();
            print_json(&sessions)?;
        }
    }
    Ok(())
}
