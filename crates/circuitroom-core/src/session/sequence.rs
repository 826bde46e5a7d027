use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Label shown for every pause step, whatever text it carries.
pub const PAUSE_LABEL: &str = "PAUSE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Exercise,
    Pause,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: Uuid,
    pub kind: StepKind,
    #[serde(default)]
    pub label: String,
    /// Duration in whole seconds.
    pub duration_secs: u32,
}

impl Step {
    pub fn exercise(label: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: StepKind::Exercise,
            label: label.into(),
            duration_secs,
        }
    }

    pub fn pause(duration_secs: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: StepKind::Pause,
            label: PAUSE_LABEL.into(),
            duration_secs,
        }
    }

    /// Text a presentation layer should show for this step.
    pub fn display_label(&self) -> &str {
        match self.kind {
            StepKind::Exercise => &self.label,
            StepKind::Pause => PAUSE_LABEL,
        }
    }

    pub fn is_pause(&self) -> bool {
        self.kind == StepKind::Pause
    }
}

/// Ordered steps plus the number of times the whole list repeats.
///
/// Passed to the engine by value; the engine keeps its own copy for the
/// lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSequence {
    pub steps: Vec<Step>,
    #[serde(default = "default_rounds")]
    pub total_rounds: u32,
}

fn default_rounds() -> u32 {
    1
}

impl StepSequence {
    pub fn new(steps: Vec<Step>, total_rounds: u32) -> Self {
        Self {
            steps,
            total_rounds,
        }
    }

    /// The built-in example program.
    pub fn example() -> Self {
        Self::new(
            vec![
                Step::exercise("Squats", 40),
                Step::pause(20),
                Step::exercise("Burpees", 40),
                Step::pause(20),
                Step::exercise("Lunges", 40),
                Step::pause(20),
                Step::exercise("Pushups", 40),
                Step::pause(60),
            ],
            1,
        )
    }

    /// Checks the invariants a session relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant: no steps, a zero-length step,
    /// or a round count of zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.steps.is_empty() {
            return Err(ValidationError::EmptySequence);
        }
        if let Some(index) = self.steps.iter().position(|s| s.duration_secs == 0) {
            return Err(ValidationError::ZeroDuration { index });
        }
        if self.total_rounds == 0 {
            return Err(ValidationError::ZeroRounds);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Seconds needed to run every step once.
    pub fn round_duration_secs(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.duration_secs)).sum()
    }

    /// Seconds of step time across all rounds.
    pub fn total_duration_secs(&self) -> u64 {
        self.round_duration_secs()
            .saturating_mul(u64::from(self.total_rounds))
    }

    /// Ticks a session takes from `start` back to idle, including the
    /// pre-roll and finishing countdowns.
    pub fn session_ticks(&self, pre_roll_secs: u32, finish_secs: u32) -> u64 {
        u64::from(pre_roll_secs) + self.total_duration_secs() + u64::from(finish_secs)
    }

    pub fn exercise_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_pause()).count()
    }

    pub fn pause_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_pause()).count()
    }
}

impl Default for StepSequence {
    fn default() -> Self {
        Self::new(Vec::new(), 1)
    }
}
