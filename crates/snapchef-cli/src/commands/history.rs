use snapchef_core::Database;

use super::{print_json, CliResult};

pub fn run(limit: usize, json: bool) -> CliResult {
    let db = Database::open()?;
    let records = db.completions(limit)?;
    if json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("No completed challenges yet.");
        return Ok(());
    }
    for record in &records {
        println!(
            "{}  {:<18} {:<32} +{} pts +{} coins",
            record.completed_at.format("%Y-%m-%d %H:%M"),
            record.challenge_id,
            record.title,
            record.points,
            record.coins,
        );
    }
    Ok(())
}
