//! Persistence: SQLite key-value storage for workouts and TOML configuration.

mod config;
pub mod database;
pub mod workouts;

pub use config::{Config, LoggingConfig, SessionConfig, SoundConfig};
pub use database::Database;
pub use workouts::{WorkoutStore, EXAMPLE_WORKOUT};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/circuitroom[-dev]/` based on CIRCUITROOM_ENV.
///
/// Set CIRCUITROOM_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CIRCUITROOM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("circuitroom-dev")
    } else {
        base_dir.join("circuitroom")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
