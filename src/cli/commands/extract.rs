//! Extract command - pull cache mount contents back out to the host

use crate::cli::args::ExtractArgs;
use crate::cli::commands::transfer_config;
use crate::engine::DockerCli;
use crate::error::MuleResult;
use crate::transfer::run_extraction;
use tracing::debug;

/// Execute the extract command
pub async fn execute(args: ExtractArgs) -> MuleResult<()> {
    let engine = DockerCli::new();
    let config = transfer_config(args.transfer, args.skip);
    debug!("Extract config: {:?}", config);

    run_extraction(&config, &engine).await
}
