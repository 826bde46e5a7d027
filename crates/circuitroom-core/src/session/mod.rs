//! Workout sessions: the step model, the tick-driven engine and its async
//! runner.

mod engine;
mod runner;
mod sequence;
mod state;
mod ticker;

pub use engine::{
    EngineConfig, SessionEngine, COUNTDOWN_CUE_WINDOW, DEFAULT_FINISH_SECS, DEFAULT_PRE_ROLL_SECS,
};
pub use runner::SessionRunner;
pub use sequence::{Step, StepKind, StepSequence, PAUSE_LABEL};
pub use state::{format_clock, Phase, SessionState, SessionView};
pub use ticker::{TickSource, TICK_PERIOD};
