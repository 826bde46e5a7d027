use clap::Subcommand;
use circuitroom_core::builder::parse_duration;
use circuitroom_core::session::format_clock;
use circuitroom_core::{Step, WorkoutDraft, WorkoutStore};

#[derive(Subcommand)]
pub enum StepAction {
    /// Append an exercise
    Add {
        /// Exercise name
        label: String,
        /// Duration in seconds or MM:SS
        #[arg(value_parser = duration_arg)]
        duration: u32,
    },
    /// Append a pause
    Pause {
        /// Duration in seconds or MM:SS
        #[arg(value_parser = duration_arg)]
        duration: u32,
    },
    /// Change a step's label or duration
    Edit {
        /// Step id (a unique prefix is enough)
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, value_parser = duration_arg)]
        duration: Option<u32>,
    },
    /// Move a step to a new 1-based position
    Move {
        /// Step id (a unique prefix is enough)
        id: String,
        position: usize,
    },
    /// Remove a step
    Remove {
        /// Step id (a unique prefix is enough)
        id: String,
    },
    /// List the steps of the current workout
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove every step
    Clear,
}

fn duration_arg(value: &str) -> Result<u32, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

fn resolve<'a>(draft: &'a WorkoutDraft, id: &str) -> Result<&'a Step, String> {
    draft
        .find(id)
        .ok_or_else(|| format!("no single step matches '{id}'"))
}

pub fn run(action: StepAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = WorkoutStore::open()?;
    let mut draft = store.load_draft()?;

    match action {
        StepAction::Add { label, duration } => {
            let id = draft.add_exercise(&label, duration)?;
            store.save_draft(&draft)?;
            println!("Added {} ({})", short_id(&id.to_string()), format_clock(duration));
        }
        StepAction::Pause { duration } => {
            let id = draft.add_pause(duration)?;
            store.save_draft(&draft)?;
            println!("Added pause {} ({})", short_id(&id.to_string()), format_clock(duration));
        }
        StepAction::Edit {
            id,
            label,
            duration,
        } => {
            if label.is_none() && duration.is_none() {
                return Err("nothing to change: pass --label and/or --duration".into());
            }
            let id = resolve(&draft, &id)?.id;
            draft.edit_step(id, label.as_deref(), duration)?;
            store.save_draft(&draft)?;
            println!("Updated {}", short_id(&id.to_string()));
        }
        StepAction::Move { id, position } => {
            if position == 0 {
                return Err("positions start at 1".into());
            }
            let id = resolve(&draft, &id)?.id;
            draft.move_step(id, position - 1)?;
            store.save_draft(&draft)?;
            print_steps(&draft);
        }
        StepAction::Remove { id } => {
            let id = resolve(&draft, &id)?.id;
            let removed = draft.remove_step(id)?;
            store.save_draft(&draft)?;
            println!("Removed {}", removed.display_label());
        }
        StepAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&draft.sequence())?);
            } else {
                print_steps(&draft);
            }
        }
        StepAction::Clear => {
            draft.clear();
            store.save_draft(&draft)?;
            println!("Cleared all steps");
        }
    }
    Ok(())
}

pub fn rounds(count: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let store = WorkoutStore::open()?;
    let mut draft = store.load_draft()?;
    if let Some(count) = count {
        draft.set_rounds(count)?;
        store.save_draft(&draft)?;
    }
    println!("Total rounds: {}", draft.total_rounds());
    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn print_steps(draft: &WorkoutDraft) {
    if draft.is_empty() {
        println!("No steps yet. Add one with `circuitroom step add <label> <duration>`.");
        return;
    }
    for (i, step) in draft.steps().iter().enumerate() {
        let id = step.id.to_string();
        println!(
            "{:>3}. {}  {:<20} {}",
            i + 1,
            short_id(&id),
            step.display_label(),
            format_clock(step.duration_secs)
        );
    }
    let sequence = draft.sequence();
    let total = u32::try_from(sequence.total_duration_secs()).unwrap_or(u32::MAX);
    println!(
        "Total rounds: {}  Total time: {}",
        draft.total_rounds(),
        format_clock(total)
    );
}
