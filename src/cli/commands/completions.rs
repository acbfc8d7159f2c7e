//! Completions command - generate shell completion scripts

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::MuleResult;
use clap::CommandFactory;
use clap_complete::generate;
use std::io;

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> MuleResult<()> {
    let mut command = Cli::command();
    generate(args.shell, &mut command, "cachemule", &mut io::stdout());
    Ok(())
}
