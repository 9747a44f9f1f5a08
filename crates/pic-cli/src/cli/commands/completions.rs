//! `pic completions` – emit a shell completion script.

use crate::cli::Cli;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;

pub fn run_completions(shell: Shell) -> Result<()> {
    clap_complete::generate(shell, &mut Cli::command(), "pic", &mut std::io::stdout());
    Ok(())
}
