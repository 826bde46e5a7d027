//! Draft and saved-workout persistence on top of the kv table.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::database::Database;
use crate::builder::WorkoutDraft;
use crate::error::{CoreError, DatabaseError, ValidationError};
use crate::session::StepSequence;

const DRAFT_KEY: &str = "current_draft";
const SAVED_KEY: &str = "saved_workouts";

/// Reserved name that always loads [`StepSequence::example`].
pub const EXAMPLE_WORKOUT: &str = "example";

type SavedWorkouts = BTreeMap<String, StepSequence>;

pub struct WorkoutStore {
    db: Database,
}

impl WorkoutStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Store backed by the default database file.
    pub fn open() -> Result<Self, CoreError> {
        Ok(Self::new(Database::open()?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The draft being edited; empty if none was saved yet.
    pub fn load_draft(&self) -> Result<WorkoutDraft, CoreError> {
        Ok(self.get_json(DRAFT_KEY)?.unwrap_or_default())
    }

    pub fn save_draft(&self, draft: &WorkoutDraft) -> Result<(), CoreError> {
        self.set_json(DRAFT_KEY, draft)
    }

    /// Save under `name`, replacing any workout with the same name.
    pub fn save_workout(&self, name: &str, sequence: &StepSequence) -> Result<(), CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        sequence.validate()?;
        let mut saved = self.saved()?;
        saved.insert(name.to_string(), sequence.clone());
        self.set_json(SAVED_KEY, &saved)?;
        tracing::info!(name, steps = sequence.len(), "workout saved");
        Ok(())
    }

    pub fn load_workout(&self, name: &str) -> Result<StepSequence, CoreError> {
        let name = name.trim();
        if let Some(sequence) = self.saved()?.remove(name) {
            return Ok(sequence);
        }
        if name == EXAMPLE_WORKOUT {
            return Ok(StepSequence::example());
        }
        Err(ValidationError::UnknownWorkout(name.to_string()).into())
    }

    /// Saved names in sorted order. The built-in example is not listed.
    pub fn list_workouts(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.saved()?.into_keys().collect())
    }

    pub fn delete_workout(&self, name: &str) -> Result<(), CoreError> {
        let name = name.trim();
        let mut saved = self.saved()?;
        if saved.remove(name).is_none() {
            return Err(ValidationError::UnknownWorkout(name.to_string()).into());
        }
        self.set_json(SAVED_KEY, &saved)?;
        tracing::info!(name, "workout deleted");
        Ok(())
    }

    fn saved(&self) -> Result<SavedWorkouts, CoreError> {
        Ok(self.get_json(SAVED_KEY)?.unwrap_or_default())
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CoreError> {
        let Some(raw) = self.db.kv_get(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).map_err(|e| DatabaseError::CorruptValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(value))
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CoreError> {
        let raw = serde_json::to_string(value)?;
        self.db.kv_set(key, &raw)?;
        Ok(())
    }
}
