use chrono::Utc;
use clap::Args;
use serde_json::{json, Value};
use snapchef_core::{ActionKind, ChallengeActionEvent};

use super::{print_json, CliResult, Workspace};

#[derive(Args)]
pub struct EventArgs {
    /// Activity kind: recipe_created, recipe_shared, rating_given,
    /// photo_uploaded or ingredients_scanned
    kind: String,
    /// Metadata entry as key=value; values that parse as JSON keep their type
    #[arg(long = "meta", value_parser = parse_meta)]
    meta: Vec<(String, Value)>,
}

fn parse_meta(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn run(args: EventArgs) -> CliResult {
    let kind: ActionKind = args.kind.parse()?;
    if kind == ActionKind::Unknown {
        eprintln!("warning: unrecognised activity kind `{}`, no challenge will match", args.kind);
    }

    let now = Utc::now();
    let mut event = ChallengeActionEvent::new(kind, now);
    for (key, value) in args.meta {
        event = event.with_meta(&key, value);
    }

    let mut ws = Workspace::open(now)?;
    let produced = ws.board.submit(event);
    let events = ws.save()?;
    print_json(&json!({ "produced": produced, "events": events }))
}
