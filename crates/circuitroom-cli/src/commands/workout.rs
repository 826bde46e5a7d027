use clap::Subcommand;
use circuitroom_core::storage::EXAMPLE_WORKOUT;
use circuitroom_core::{WorkoutDraft, WorkoutStore};

use super::step::print_steps;

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Save the current steps under a name
    Save { name: String },
    /// Replace the current steps with a saved workout ("example" is built in)
    Load { name: String },
    /// List saved workouts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved workout
    Delete { name: String },
}

pub fn run(action: WorkoutAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = WorkoutStore::open()?;
    match action {
        WorkoutAction::Save { name } => {
            let draft = store.load_draft()?;
            store.save_workout(&name, &draft.sequence())?;
            println!("Saved '{}'", name.trim());
        }
        WorkoutAction::Load { name } => {
            let draft = WorkoutDraft::from(store.load_workout(&name)?);
            store.save_draft(&draft)?;
            print_steps(&draft);
        }
        WorkoutAction::List { json } => {
            let names = store.list_workouts()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else if names.is_empty() {
                println!("No saved workouts. Try `circuitroom workout load {EXAMPLE_WORKOUT}`.");
            } else {
                for name in names {
                    println!("{name}");
                }
            }
        }
        WorkoutAction::Delete { name } => {
            store.delete_workout(&name)?;
            println!("Deleted '{}'", name.trim());
        }
    }
    Ok(())
}
