//! # Circuitroom Core Library
//!
//! Core logic for the circuitroom interval workout timer. The CLI (and any
//! other front end) is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session engine**: a synchronous state machine advanced one second at a
//!   time by `tick()`. It owns no timers and no threads.
//! - **Runner**: a tokio task that ticks the engine once per second and
//!   publishes views and events.
//! - **Audio**: fire-and-forget cue tones behind the [`CuePlayer`] seam.
//! - **Storage**: SQLite key-value persistence for the draft and saved
//!   workouts, TOML configuration.
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: session state machine
//! - [`SessionRunner`]: async driver with cancellable tick source
//! - [`AudioCueScheduler`]: lazy tone output for step and countdown cues
//! - [`WorkoutDraft`]: editable step list
//! - [`WorkoutStore`]: draft and saved workout persistence
//! - [`Config`]: application configuration

pub mod audio;
pub mod builder;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;

pub use audio::{AudioCueScheduler, Cue, CuePlayer, SilentCues};
pub use builder::WorkoutDraft;
pub use error::{
    AudioError, ConfigError, CoreError, DatabaseError, EngineError, Result, ValidationError,
};
pub use events::Event;
pub use session::{
    EngineConfig, Phase, SessionEngine, SessionRunner, SessionState, SessionView, Step, StepKind,
    StepSequence,
};
pub use storage::{Config, Database, WorkoutStore};
