pub mod config;
pub mod score;
pub mod seed;
pub mod stats;
pub mod streak;

use std::path::PathBuf;

use mindflow_core::{Config, Database};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the database named by `--db`, the config, or the default location.
pub fn open_database(explicit: Option<PathBuf>) -> Result<Database, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        return Ok(Database::open_at(path)?);
    }
    match Config::load_or_default().storage.database_path {
        Some(path) => Ok(Database::open_at(path)?),
        None => Ok(Database::open()?),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
