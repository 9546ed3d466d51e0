//! Completions command - prints a shell completion script.

use clap::CommandFactory as _;
use clap_complete::Shell;

use crate::Cli;

/// Executes the `sediment completions` command.
pub fn run(shell: Shell) -> super::Result {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}
