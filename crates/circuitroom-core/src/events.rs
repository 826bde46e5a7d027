use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::StepKind;

/// Every state change in a session produces an Event.
/// The runner broadcasts them; the CLI logs or prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_id: u64,
        total_steps: usize,
        total_rounds: u32,
        at: DateTime<Utc>,
    },
    StepStarted {
        step_index: usize,
        round: u32,
        kind: StepKind,
        label: String,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// A new traversal of the step list began (round 2 onwards).
    RoundStarted {
        round: u32,
        total_rounds: u32,
        at: DateTime<Utc>,
    },
    /// Countdown cue requested while `seconds_remaining` seconds were left.
    CountdownCue {
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    SessionResumed {
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    FinishingStarted {
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: u64,
        rounds_completed: u32,
        at: DateTime<Utc>,
    },
    SessionStopped {
        session_id: u64,
        at: DateTime<Utc>,
    },
}
