//! CLI argument definitions using clap derive

use crate::transfer::SyncMode;
use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// cachemule - save and restore BuildKit RUN cache mounts
///
/// Moves the contents of `RUN --mount=type=cache` volumes between a CI
/// runner's persistent cache storage and ephemeral build-time mounts.
#[derive(Parser, Debug)]
#[command(name = "cachemule")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push saved host cache directories into their cache mounts
    Inject(InjectArgs),

    /// Pull cache mount contents back out to host directories
    Extract(ExtractArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Flags shared by both transfer directions
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Cache map JSON: keys are host-relative paths, values are a target
    /// string or an options object. Empty means: scan the build file.
    #[arg(long, env = "CACHEMULE_CACHE_MAP", default_value = "")]
    pub cache_map: String,

    /// Build file scanned for RUN cache mounts when the cache map is empty
    #[arg(long, env = "CACHEMULE_DOCKERFILE", default_value = "Dockerfile")]
    pub dockerfile: PathBuf,

    /// Host cache root prefixed onto every cache map key
    #[arg(long, env = "CACHEMULE_CACHE_ROOT")]
    pub cache_root: Option<String>,

    /// Scratch workspace (recreated per entry), relative to the working root
    #[arg(long, env = "CACHEMULE_SCRATCH_DIR", default_value = ".cachemule-scratch")]
    pub scratch_dir: PathBuf,

    /// Data movement strategy
    #[arg(long, value_enum, default_value = "cp")]
    pub sync: SyncMode,

    /// buildx builder instance to use
    #[arg(long, env = "CACHEMULE_BUILDER", default_value = "default")]
    pub builder: String,

    /// Utility base image for helper builds (rsync mode needs rsync in it)
    #[arg(long, env = "CACHEMULE_UTILITY_IMAGE", default_value = "ubuntu:latest")]
    pub image: String,
}

/// Arguments for the inject command
#[derive(Args, Debug)]
pub struct InjectArgs {
    #[command(flatten)]
    pub transfer: TransferArgs,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub transfer: TransferArgs,

    /// Skip extraction (the persistent cache was restored warm)
    #[arg(long, env = "CACHEMULE_SKIP_EXTRACTION")]
    pub skip: bool,
}

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
