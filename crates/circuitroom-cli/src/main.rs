use clap::{Parser, Subcommand};
use circuitroom_core::Config;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "circuitroom", version, about = "Interval workout timer")]
pub struct Cli {
    /// Log at debug level (RUST_LOG still wins)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit the steps of the current workout
    Step {
        #[command(subcommand)]
        action: commands::step::StepAction,
    },
    /// Show or set how many times the step list repeats
    Rounds {
        /// New round count (at least 1)
        count: Option<u32>,
    },
    /// Save, load and delete named workouts
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
    /// Run the current workout
    Run(commands::run::RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    logging::init_logging(&config, cli.verbose);

    let result = match cli.command {
        Commands::Step { action } => commands::step::run(action),
        Commands::Rounds { count } => commands::step::rounds(count),
        Commands::Workout { action } => commands::workout::run(action),
        Commands::Run(args) => commands::run::run(args, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            commands::completions::run(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
