use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::Cli;

pub fn run(shell: Shell) {
    let mut command = Cli::command();
    generate(shell, &mut command, "circuitroom", &mut std::io::stdout());
}
