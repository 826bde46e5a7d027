use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::session::{Step, StepKind, StepSequence};

/// The step list being edited, plus its round count.
///
/// Every mutation keeps the draft startable step-wise (no zero durations,
/// no blank exercise labels); only emptiness is left to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDraft {
    steps: Vec<Step>,
    total_rounds: u32,
}

impl Default for WorkoutDraft {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            total_rounds: 1,
        }
    }
}

impl From<StepSequence> for WorkoutDraft {
    fn from(sequence: StepSequence) -> Self {
        Self {
            steps: sequence.steps,
            total_rounds: sequence.total_rounds.max(1),
        }
    }
}

impl WorkoutDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append an exercise step and return its id.
    pub fn add_exercise(
        &mut self,
        label: &str,
        duration_secs: u32,
    ) -> Result<Uuid, ValidationError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        check_duration(self.steps.len(), duration_secs)?;
        let step = Step::exercise(label, duration_secs);
        let id = step.id;
        self.steps.push(step);
        Ok(id)
    }

    /// Append a pause step and return its id.
    pub fn add_pause(&mut self, duration_secs: u32) -> Result<Uuid, ValidationError> {
        check_duration(self.steps.len(), duration_secs)?;
        let step = Step::pause(duration_secs);
        let id = step.id;
        self.steps.push(step);
        Ok(id)
    }

    /// Change a step's label and/or duration. Labels of pause steps are
    /// ignored; they always show as `PAUSE`.
    pub fn edit_step(
        &mut self,
        id: Uuid,
        label: Option<&str>,
        duration_secs: Option<u32>,
    ) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        if let Some(secs) = duration_secs {
            check_duration(index, secs)?;
        }
        let label = label.map(str::trim);
        let step = &mut self.steps[index];
        if let Some(label) = label {
            if step.kind == StepKind::Exercise {
                if label.is_empty() {
                    return Err(ValidationError::EmptyLabel);
                }
                step.label = label.to_string();
            }
        }
        if let Some(secs) = duration_secs {
            step.duration_secs = secs;
        }
        Ok(())
    }

    pub fn remove_step(&mut self, id: Uuid) -> Result<Step, ValidationError> {
        let index = self.index_of(id)?;
        Ok(self.steps.remove(index))
    }

    /// Move a step to `new_index`, clamped to the end of the list.
    pub fn move_step(&mut self, id: Uuid, new_index: usize) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        let step = self.steps.remove(index);
        let new_index = new_index.min(self.steps.len());
        self.steps.insert(new_index, step);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn set_rounds(&mut self, rounds: u32) -> Result<(), ValidationError> {
        if rounds == 0 {
            return Err(ValidationError::ZeroRounds);
        }
        self.total_rounds = rounds;
        Ok(())
    }

    /// Look a step up by id, or by a unique prefix of its hyphenated form.
    pub fn find(&self, id_or_prefix: &str) -> Option<&Step> {
        let needle = id_or_prefix.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return None;
        }
        let mut matches = self
            .steps
            .iter()
            .filter(|s| s.id.hyphenated().to_string().starts_with(&needle));
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }

    /// Snapshot for the engine.
    pub fn sequence(&self) -> StepSequence {
        StepSequence::new(self.steps.clone(), self.total_rounds)
    }

    fn index_of(&self, id: Uuid) -> Result<usize, ValidationError> {
        self.steps
            .iter()
            .position(|s| s.id == id)
            .ok_or(ValidationError::UnknownStep(id))
    }
}

/// `index` is the position the step has, or would have once appended.
fn check_duration(index: usize, duration_secs: u32) -> Result<(), ValidationError> {
    if duration_secs == 0 {
        return Err(ValidationError::ZeroDuration { index });
    }
    Ok(())
}
