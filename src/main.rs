//! cachemule - BuildKit cache mount transfer tool
//!
//! CLI entry point that dispatches to subcommands.

use cachemule::cli::{Cli, Commands};
use cachemule::error::MuleResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> MuleResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug (full diagnostic
    // dumps of resolved maps, mount args, and generated recipes)
    let filter = match cli.verbose {
        0 => EnvFilter::new("cachemule=warn"),
        1 => EnvFilter::new("cachemule=info"),
        _ => EnvFilter::new("cachemule=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Inject(args) => cachemule::cli::commands::inject(args).await,
        Commands::Extract(args) => cachemule::cli::commands::extract(args).await,
        Commands::Completions(args) => cachemule::cli::commands::completions(args),
    }
}
