mod config;
pub mod database;
pub mod migrations;
pub mod seed;

pub use config::{Config, LoggingConfig, ServerConfig, StorageConfig, TasksConfig};
pub use database::Database;
pub use seed::{seed_catalog, seed_demo_user, SeedSummary};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/mindflow[-dev]/` based on MINDFLOW_ENV.
///
/// Set MINDFLOW_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MINDFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mindflow-dev")
    } else {
        base_dir.join("mindflow")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
