use std::path::PathBuf;

use chrono::Utc;
use serde_json::json;

use super::{open_database, print_json, CommandResult};

pub fn run(db: Option<PathBuf>, user_id: i64) -> CommandResult {
    let db = open_database(db)?;
    let stats = db.dashboard_stats(user_id, Utc::now())?;
    let categories = db.category_progress(user_id)?;
    print_json(&json!({ "stats": stats, "categories": categories }))
}
