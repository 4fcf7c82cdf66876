use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use serde_json::json;
use snapchef_core::{Challenge, ProgressOutcome, ScheduleEngine};

use super::{format_remaining, label, print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum ChallengesAction {
    /// List the active challenges, soonest ending first
    List {
        /// Evaluate at this instant (RFC 3339) instead of now; nothing is saved
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one challenge as JSON
    Show {
        /// Challenge ID, e.g. daily-45-2024
        id: String,
    },
    /// Join a challenge
    Join {
        /// Challenge ID
        id: String,
    },
    /// Submit one entry toward a joined challenge
    Submit {
        /// Challenge ID
        id: String,
    },
    /// Preview the challenges a calendar day generates
    Day {
        /// Date (YYYY-MM-DD), defaults to today (UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ChallengesAction) -> CliResult {
    match action {
        ChallengesAction::List { at, json } => {
            let now = at.unwrap_or_else(Utc::now);
            let ws = Workspace::open(now)?;
            let active = ws.board.active();
            if json {
                print_json(&active)?;
            } else if active.is_empty() {
                println!("No active challenges.");
            } else {
                for challenge in active {
                    print_row(challenge, now);
                }
            }
        }
        ChallengesAction::Show { id } => {
            let ws = Workspace::open(Utc::now())?;
            match ws.board.get(&id) {
                Some(challenge) => print_json(challenge)?,
                None => return Err(format!("challenge not found: {id}").into()),
            }
        }
        ChallengesAction::Join { id } => {
            let now = Utc::now();
            let mut ws = Workspace::open(now)?;
            let outcome = ws.board.join(&id, now);
            ws.save()?;
            if !outcome.is_joined() {
                return Err(format!("cannot join {id}: {}", label(&outcome)).into());
            }
            println!("Joined {id}");
        }
        ChallengesAction::Submit { id } => {
            let now = Utc::now();
            let mut ws = Workspace::open(now)?;
            let outcome = ws.board.submit_entry(&id, now);
            let events = ws.save()?;
            let reason = match outcome {
                ProgressOutcome::Advanced { .. } | ProgressOutcome::Completed { .. } => {
                    return print_json(&json!({ "outcome": outcome, "events": events }));
                }
                ProgressOutcome::NotFound => "not found",
                ProgressOutcome::NotJoined => "not joined",
                ProgressOutcome::Closed => "closed",
            };
            return Err(format!("cannot submit to {id}: {reason}").into());
        }
        ChallengesAction::Day { date, json } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let generated = ScheduleEngine::default().generate_for_date(date);
            if json {
                print_json(&generated)?;
            } else {
                for challenge in &generated {
                    println!(
                        "{:<18} {:<8} {:<32} {} -> {}",
                        challenge.id,
                        challenge.cadence.as_str(),
                        challenge.title,
                        challenge.starts_at.format("%Y-%m-%d %H:%M"),
                        challenge.ends_at.format("%Y-%m-%d %H:%M"),
                    );
                }
            }
        }
    }
    Ok(())
}

fn print_row(challenge: &Challenge, now: DateTime<Utc>) {
    let premium = if challenge.is_premium { " *" } else { "" };
    println!(
        "{:<18} {:<8} {:<32} {:<12} {:<16} {:>8}{premium}",
        challenge.id,
        label(&challenge.difficulty),
        challenge.title,
        label(&challenge.state),
        challenge.goal.describe(challenge.units),
        format_remaining(challenge.time_remaining(now)),
    );
}
