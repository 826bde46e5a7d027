//! Session engine implementation.
//!
//! The engine is a tick-driven state machine. It owns no timer: a tick
//! source (see [`super::SessionRunner`]) calls `tick()` once per elapsed
//! second, and user commands arrive through `pause()`, `resume()` and
//! `stop()`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> PreRoll -> Running <-> Paused
//!                    Running -> Finishing -> Idle
//! any  -> Idle  (stop)
//! ```
//!
//! The zero value of a countdown is never observed between ticks: the tick
//! that would bring a countdown to zero performs the transition it triggers.
//! A session therefore takes `pre_roll + sum(durations) * rounds + finish`
//! ticks from `start` back to `Idle`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(Box::new(scheduler));
//! engine.start(sequence)?;
//! // Once per second:
//! for event in engine.tick() { /* render */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::sequence::{Step, StepSequence};
use super::state::{Phase, SessionState, SessionView};
use crate::audio::{CuePlayer, SilentCues};
use crate::error::{EngineError, ValidationError};
use crate::events::Event;

pub const DEFAULT_PRE_ROLL_SECS: u32 = 3;
pub const DEFAULT_FINISH_SECS: u32 = 3;
/// Countdown cues fire while this many seconds or fewer remain in a step.
pub const COUNTDOWN_CUE_WINDOW: u32 = 4;

/// Fixed countdown lengths and the cue window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub pre_roll_secs: u32,
    pub finish_secs: u32,
    pub countdown_cue_window: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pre_roll_secs: DEFAULT_PRE_ROLL_SECS,
            finish_secs: DEFAULT_FINISH_SECS,
            countdown_cue_window: COUNTDOWN_CUE_WINDOW,
        }
    }
}

impl EngineConfig {
    // A zero-length countdown still takes one tick to leave its phase.
    fn pre_roll(&self) -> u32 {
        self.pre_roll_secs.max(1)
    }

    fn finish(&self) -> u32 {
        self.finish_secs.max(1)
    }

    /// Ticks a session over `sequence` takes to return to `Idle`.
    pub fn session_ticks(&self, sequence: &StepSequence) -> u64 {
        sequence.session_ticks(self.pre_roll(), self.finish())
    }
}

/// The session state machine.
pub struct SessionEngine {
    config: EngineConfig,
    state: SessionState,
    /// Private copy taken at `start`; `None` while idle.
    sequence: Option<StepSequence>,
    /// Incremented by every successful `start`.
    session_id: u64,
    cues: Box<dyn CuePlayer>,
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl SessionEngine {
    pub fn new(cues: Box<dyn CuePlayer>) -> Self {
        Self::with_config(EngineConfig::default(), cues)
    }

    pub fn with_config(config: EngineConfig, cues: Box<dyn CuePlayer>) -> Self {
        Self {
            config,
            state: SessionState::idle(),
            sequence: None,
            session_id: 0,
            cues,
        }
    }

    /// Engine that never produces sound.
    pub fn silent() -> Self {
        Self::new(Box::new(SilentCues))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn sequence(&self) -> Option<&StepSequence> {
        self.sequence.as_ref()
    }

    pub fn current_step(&self) -> Option<&Step> {
        match self.state.phase {
            Phase::Running | Phase::Paused => self
                .sequence
                .as_ref()
                .and_then(|s| s.step(self.state.current_step_index)),
            _ => None,
        }
    }

    /// Read-only copy of the counters.
    pub fn snapshot(&self) -> SessionState {
        self.state
    }

    /// Snapshot plus labels and totals for rendering.
    pub fn view(&self) -> SessionView {
        let step = self.current_step();
        let countdown_secs = match self.state.phase {
            Phase::Idle => 0,
            Phase::PreRoll => self.config.pre_roll(),
            Phase::Finishing => self.config.finish(),
            Phase::Running | Phase::Paused => step.map(|s| s.duration_secs).unwrap_or(0),
        };
        SessionView {
            state: self.state,
            total_rounds: self.sequence.as_ref().map(|s| s.total_rounds).unwrap_or(0),
            step_kind: step.map(|s| s.kind),
            step_label: step.map(|s| s.display_label().to_string()).unwrap_or_default(),
            countdown_secs,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Mute or unmute cues without touching the session.
    pub fn set_cues_enabled(&mut self, enabled: bool) {
        self.cues.set_enabled(enabled);
    }

    /// Begin a new session over a private copy of `sequence`.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` unless idle, `EmptySequence` for a sequence with no
    /// steps, `InvalidSequence` for zero-length steps or zero rounds. The
    /// state is untouched on error.
    pub fn start(&mut self, sequence: StepSequence) -> Result<Vec<Event>, EngineError> {
        if self.state.phase.is_active() {
            return Err(EngineError::AlreadyRunning);
        }
        match sequence.validate() {
            Ok(()) => {}
            Err(ValidationError::EmptySequence) => return Err(EngineError::EmptySequence),
            Err(other) => return Err(EngineError::InvalidSequence(other)),
        }

        self.session_id += 1;
        self.state = SessionState {
            phase: Phase::PreRoll,
            current_step_index: 0,
            current_round: 1,
            seconds_remaining: self.config.pre_roll(),
        };
        let event = Event::SessionStarted {
            session_id: self.session_id,
            total_steps: sequence.len(),
            total_rounds: sequence.total_rounds,
            at: Utc::now(),
        };
        tracing::info!(
            session_id = self.session_id,
            steps = sequence.len(),
            rounds = sequence.total_rounds,
            "session started"
        );
        self.sequence = Some(sequence);
        Ok(vec![event])
    }

    /// Advance one second. Returns the events the transition produced.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        match self.state.phase {
            Phase::Idle | Phase::Paused => {}
            Phase::PreRoll => {
                if self.state.seconds_remaining > 1 {
                    self.state.seconds_remaining -= 1;
                } else {
                    self.begin_step(0, 1, &mut events);
                }
            }
            Phase::Running => {
                let remaining = self.state.seconds_remaining;
                if (1..=self.config.countdown_cue_window).contains(&remaining) {
                    self.cues.play_countdown();
                    events.push(Event::CountdownCue {
                        seconds_remaining: remaining,
                        at: Utc::now(),
                    });
                }
                if remaining > 1 {
                    self.state.seconds_remaining -= 1;
                } else {
                    self.advance(&mut events);
                }
            }
            Phase::Finishing => {
                if self.state.seconds_remaining > 1 {
                    self.state.seconds_remaining -= 1;
                } else {
                    self.complete(&mut events);
                }
            }
        }
        events
    }

    /// Freeze the running countdown. No-op outside `Running`.
    pub fn pause(&mut self) -> Option<Event> {
        if self.state.phase != Phase::Running {
            return None;
        }
        self.state.phase = Phase::Paused;
        tracing::debug!(remaining = self.state.seconds_remaining, "session paused");
        Some(Event::SessionPaused {
            seconds_remaining: self.state.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Continue a paused countdown where it stopped. No-op outside `Paused`.
    pub fn resume(&mut self) -> Option<Event> {
        if self.state.phase != Phase::Paused {
            return None;
        }
        self.state.phase = Phase::Running;
        tracing::debug!(remaining = self.state.seconds_remaining, "session resumed");
        Some(Event::SessionResumed {
            seconds_remaining: self.state.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Abandon the session from any phase and silence pending cues.
    pub fn stop(&mut self) -> Option<Event> {
        self.cues.cancel_pending();
        let was_active = self.state.phase.is_active();
        self.reset();
        if !was_active {
            return None;
        }
        tracing::info!(session_id = self.session_id, "session stopped");
        Some(Event::SessionStopped {
            session_id: self.session_id,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset(&mut self) {
        self.state = SessionState::idle();
        self.sequence = None;
    }

    fn begin_step(&mut self, index: usize, round: u32, events: &mut Vec<Event>) {
        let Some(step) = self.sequence.as_ref().and_then(|s| s.step(index)) else {
            // start() validated the sequence, so this only guards a logic error.
            tracing::error!(index, "step index out of range, ending session");
            self.reset();
            return;
        };
        let duration_secs = step.duration_secs;
        let event = Event::StepStarted {
            step_index: index,
            round,
            kind: step.kind,
            label: step.display_label().to_string(),
            duration_secs,
            at: Utc::now(),
        };
        tracing::debug!(index, round, duration_secs, "step started");

        self.state = SessionState {
            phase: Phase::Running,
            current_step_index: index,
            current_round: round,
            seconds_remaining: duration_secs,
        };
        self.cues.play_step_start();
        events.push(event);
    }

    fn advance(&mut self, events: &mut Vec<Event>) {
        let (len, total_rounds) = match self.sequence.as_ref() {
            Some(s) => (s.len(), s.total_rounds),
            None => (0, 0),
        };
        let index = self.state.current_step_index;
        let round = self.state.current_round;

        if index + 1 < len {
            self.begin_step(index + 1, round, events);
        } else if round < total_rounds {
            events.push(Event::RoundStarted {
                round: round + 1,
                total_rounds,
                at: Utc::now(),
            });
            self.begin_step(0, round + 1, events);
        } else {
            self.state.phase = Phase::Finishing;
            self.state.seconds_remaining = self.config.finish();
            tracing::debug!("finishing countdown started");
            events.push(Event::FinishingStarted { at: Utc::now() });
        }
    }

    fn complete(&mut self, events: &mut Vec<Event>) {
        let rounds_completed = self.sequence.as_ref().map(|s| s.total_rounds).unwrap_or(0);
        self.reset();
        tracing::info!(session_id = self.session_id, rounds_completed, "session completed");
        events.push(Event::SessionCompleted {
            session_id: self.session_id,
            rounds_completed,
            at: Utc::now(),
        });
    }
}
