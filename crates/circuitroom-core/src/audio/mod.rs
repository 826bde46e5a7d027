//! Audio cues for session transitions.
//!
//! The engine only knows the [`CuePlayer`] seam. [`AudioCueScheduler`] is the
//! production implementation: it turns cues into [`Tone`]s and hands them to a
//! lazily opened [`ToneSink`] without waiting for playback.

#[cfg(feature = "audio")]
mod output;
mod scheduler;
mod sink;
mod tone;

#[cfg(feature = "audio")]
pub use output::CpalToneSink;
pub use scheduler::{AudioCueScheduler, SinkFactory};
pub use sink::{default_sink, TerminalBellSink, ToneSink};
pub use tone::Tone;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// A step (or a new round) just began.
    StepStart,
    /// One of the final seconds of a step.
    Countdown,
}

/// What the engine needs from an audio layer. Implementations must return
/// immediately; playback happens elsewhere.
pub trait CuePlayer: Send {
    fn play_step_start(&mut self);
    fn play_countdown(&mut self);
    /// Drop anything queued or still sounding.
    fn cancel_pending(&mut self) {}
    /// Mute or unmute future cues.
    fn set_enabled(&mut self, _enabled: bool) {}
}

/// Cue player that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCues;

impl CuePlayer for SilentCues {
    fn play_step_start(&mut self) {}
    fn play_countdown(&mut self) {}
}
