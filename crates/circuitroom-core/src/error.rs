//! Core error types for circuitroom-core.
//!
//! Errors are grouped by the boundary that raises them. Engine errors are
//! returned synchronously from the command that caused them; audio errors
//! never leave the cue scheduler.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for circuitroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session engine rejected a command
    #[error("Session error: {0}")]
    Engine(#[from] EngineError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by [`crate::session::SessionEngine`] commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `start` was called with a sequence that has no steps.
    #[error("cannot start a session with no steps")]
    EmptySequence,

    /// `start` was called while a session is in progress.
    #[error("a session is already running; stop it first")]
    AlreadyRunning,

    /// The sequence failed validation for a reason other than being empty.
    #[error("invalid sequence: {0}")]
    InvalidSequence(ValidationError),
}

/// Tone output failures. Absorbed by the cue scheduler and only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No output device, or the device refused the stream.
    #[error("audio unavailable: {0}")]
    Unavailable(String),

    /// The audio thread has gone away.
    #[error("audio output disconnected")]
    Disconnected,
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored value could not be decoded
    #[error("Corrupt value for key '{key}': {message}")]
    CorruptValue { key: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors for steps, sequences and stored workouts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Sequence has no steps
    #[error("sequence has no steps")]
    EmptySequence,

    /// A step has a zero duration
    #[error("step {index} has a duration of 0 seconds")]
    ZeroDuration { index: usize },

    /// Round count below one
    #[error("total rounds must be at least 1")]
    ZeroRounds,

    /// Exercise label missing
    #[error("exercise label must not be empty")]
    EmptyLabel,

    /// Workout name missing
    #[error("workout name must not be empty")]
    EmptyName,

    /// No step with the given id
    #[error("no step with id {0}")]
    UnknownStep(uuid::Uuid),

    /// Duration text could not be parsed
    #[error("invalid duration '{0}': use seconds or MM:SS")]
    InvalidDuration(String),

    /// No saved workout with the given name
    #[error("no saved workout named '{0}'")]
    UnknownWorkout(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
