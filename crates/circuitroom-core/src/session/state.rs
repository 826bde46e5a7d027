//! Session state and the read-only views handed to presentation.

use serde::{Deserialize, Serialize};

use super::sequence::StepKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    PreRoll,
    Running,
    Paused,
    Finishing,
}

impl Phase {
    /// True while a session exists, whatever its phase.
    pub fn is_active(self) -> bool {
        self != Phase::Idle
    }
}

/// Engine-owned counters. Only the engine mutates these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionState {
    pub phase: Phase,
    /// 0-based; meaningful only while `Running` or `Paused`.
    pub current_step_index: usize,
    /// 1-based while a session is active, 0 when idle.
    pub current_round: u32,
    pub seconds_remaining: u32,
}

impl SessionState {
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Snapshot enriched with what a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionView {
    pub state: SessionState,
    pub total_rounds: u32,
    pub step_kind: Option<StepKind>,
    pub step_label: String,
    /// Full length of the current countdown, for progress bars.
    pub countdown_secs: u32,
}

impl SessionView {
    /// Heading for the current phase.
    pub fn title(&self) -> String {
        match self.state.phase {
            Phase::Idle => String::new(),
            Phase::PreRoll => "Get Ready!".into(),
            Phase::Finishing => "Done!".into(),
            Phase::Running | Phase::Paused => {
                let mut title = self.step_label.clone();
                if self.total_rounds > 1 {
                    title.push_str(&format!(
                        " ({}/{})",
                        self.state.current_round, self.total_rounds
                    ));
                }
                if self.state.phase == Phase::Paused {
                    title.push_str(" - paused");
                }
                title
            }
        }
    }

    /// Remaining time as `MM:SS` while a step runs, plain seconds otherwise.
    pub fn clock(&self) -> String {
        match self.state.phase {
            Phase::PreRoll | Phase::Finishing => self.state.seconds_remaining.to_string(),
            _ => format_clock(self.state.seconds_remaining),
        }
    }

    /// Fraction of the current countdown still left.
    pub fn progress(&self) -> f64 {
        if self.countdown_secs == 0 {
            return 0.0;
        }
        (f64::from(self.state.seconds_remaining) / f64::from(self.countdown_secs)).clamp(0.0, 1.0)
    }
}

/// Formats seconds as zero-padded `MM:SS`. Minutes are not wrapped at 60.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
