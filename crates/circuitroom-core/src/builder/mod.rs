//! Editing the step list between sessions.

mod draft;
mod duration;

pub use draft::WorkoutDraft;
pub use duration::parse_duration;
