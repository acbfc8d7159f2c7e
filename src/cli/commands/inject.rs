//! Inject command - push host cache directories into cache mounts

use crate::cli::args::InjectArgs;
use crate::cli::commands::transfer_config;
use crate::engine::DockerCli;
use crate::error::MuleResult;
use crate::transfer::run_injection;
use tracing::debug;

/// Execute the inject command
pub async fn execute(args: InjectArgs) -> MuleResult<()> {
    let engine = DockerCli::new();
    let config = transfer_config(args.transfer, false);
    debug!("Inject config: {:?}", config);

    run_injection(&config, &engine).await
}
