use std::path::PathBuf;

use chrono::Utc;
use mindflow_core::storage::{seed_catalog, seed_demo_user};
use serde_json::json;

use super::{open_database, print_json, CommandResult};

pub fn run(db: Option<PathBuf>, demo_user: Option<i64>) -> CommandResult {
    let db = open_database(db)?;
    let now = Utc::now();
    let catalog = seed_catalog(&db, now)?;

    let demo = match demo_user {
        Some(user_id) if user_id <= 0 => return Err("demo user id must be positive".into()),
        Some(user_id) => Some(seed_demo_user(&db, user_id, now, &mut rand::thread_rng())?),
        None => None,
    };

    print_json(&json!({ "catalog": catalog, "demo": demo }))
}
