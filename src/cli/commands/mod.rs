//! Command implementations

mod completions;
mod extract;
mod inject;

pub use completions::execute as completions;
pub use extract::execute as extract;
pub use inject::execute as inject;

use crate::cli::args::TransferArgs;
use crate::transfer::TransferConfig;

/// Build the orchestrator configuration from shared CLI flags.
fn transfer_config(args: TransferArgs, skip_extraction: bool) -> TransferConfig {
    TransferConfig {
        cache_map: args.cache_map,
        build_file: args.dockerfile,
        cache_root: args.cache_root,
        scratch_dir: args.scratch_dir,
        sync: args.sync,
        builder: args.builder,
        image: args.image,
        skip_extraction,
    }
}
