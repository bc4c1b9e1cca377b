use std::path::PathBuf;

use chrono::Utc;

use super::{open_database, print_json, CommandResult};

pub fn run(db: Option<PathBuf>, user_id: i64) -> CommandResult {
    let db = open_database(db)?;
    let streak = db.mindfulness_streak(user_id, Utc::now().date_naive())?;
    print_json(&streak)
}
