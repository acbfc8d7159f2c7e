//! Transfer orchestration
//!
//! Resolves the cache map once, then drives the transfer engine over every
//! entry strictly sequentially. The builder instance and its build cache
//! are shared mutable resources; entries never run concurrently.

use crate::cachemap::{self, CacheMapEntry};
use crate::engine::ContainerEngine;
use crate::error::{MuleError, MuleResult};
use crate::transfer::{extract_one, inject_one, SyncMode, TransferContext};
use console::style;
use std::path::PathBuf;
use tracing::info;

/// Everything one invocation needs, gathered from flags and environment.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Raw cache map JSON; empty triggers build-file auto-discovery
    pub cache_map: String,
    /// Build file scanned when the cache map is empty
    pub build_file: PathBuf,
    /// Optional host cache root prefixed onto every cache map key
    pub cache_root: Option<String>,
    /// Scratch workspace, relative to the working root
    pub scratch_dir: PathBuf,
    /// Data movement strategy
    pub sync: SyncMode,
    /// buildx builder instance name
    pub builder: String,
    /// Utility base image for helper builds
    pub image: String,
    /// Skip extraction entirely (upstream cache was already warm)
    pub skip_extraction: bool,
}

/// Inject every resolved cache entry into its cache mount.
pub async fn run_injection(
    config: &TransferConfig,
    engine: &dyn ContainerEngine,
) -> MuleResult<()> {
    let entries = resolve_map(config).await?;
    engine.ensure_ready().await?;
    let ctx = context(config, engine)?;

    for entry in &entries {
        inject_one(entry, &ctx).await?;
        println!(
            "{} Injected {} into cache mount",
            style("✓").green(),
            style(&entry.host_dir).cyan()
        );
    }

    info!("Injected {} cache entries", entries.len());
    Ok(())
}

/// Extract every resolved cache entry back out to the host.
pub async fn run_extraction(
    config: &TransferConfig,
    engine: &dyn ContainerEngine,
) -> MuleResult<()> {
    if config.skip_extraction {
        println!(
            "{} Extraction skipped: persistent cache was already warm",
            style("-").dim()
        );
        return Ok(());
    }

    let entries = resolve_map(config).await?;
    engine.ensure_ready().await?;
    let ctx = context(config, engine)?;

    for entry in &entries {
        extract_one(entry, &ctx).await?;
        println!(
            "{} Extracted cache mount into {}",
            style("✓").green(),
            style(&entry.host_dir).cyan()
        );
    }

    info!("Extracted {} cache entries", entries.len());
    Ok(())
}

async fn resolve_map(config: &TransferConfig) -> MuleResult<Vec<CacheMapEntry>> {
    cachemap::resolve(
        &config.cache_map,
        config.cache_root.as_deref(),
        &config.build_file,
    )
    .await
}

fn context<'a>(
    config: &TransferConfig,
    engine: &'a dyn ContainerEngine,
) -> MuleResult<TransferContext<'a>> {
    let work_root =
        std::env::current_dir().map_err(|e| MuleError::io("getting current directory", e))?;

    Ok(TransferContext {
        engine,
        work_root,
        scratch_root: config.scratch_dir.clone(),
        image: config.image.clone(),
        builder: config.builder.clone(),
        sync: config.sync,
    })
}
