//! Cache extraction: pull a cache mount's contents out to the host

use crate::cachemap::CacheMapEntry;
use crate::engine::{BuildRequest, ContainerEngine};
use crate::error::{MuleError, MuleResult};
use crate::transfer::recipe::{
    container_name, extraction_recipe, image_tag, write_bust_stamp, SyncMode, HOST_BIND, STAGE_DIR,
};
use crate::transfer::{cleanup, recreate_dir, remove_dir_if_exists, validate_entry, TransferContext};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Extract one cache entry: build a helper image that stages the cache
/// mount's contents, then move the staged data into the host directory.
pub async fn extract_one(entry: &CacheMapEntry, ctx: &TransferContext<'_>) -> MuleResult<()> {
    let mount_args = entry.options.mount_args();
    validate_entry(&entry.host_dir, &ctx.scratch_root, &mount_args)?;

    let scratch = ctx.work_root.join(&ctx.scratch_root);
    recreate_dir(&scratch).await?;
    write_bust_stamp(&scratch).await?;

    let recipe = extraction_recipe(&ctx.image, &mount_args, entry.options.target());
    debug!("Mount args for '{}': {}", entry.host_dir, mount_args);
    debug!("Extraction recipe for '{}':\n{}", entry.host_dir, recipe);

    let dockerfile = scratch.join("Dockerfile");
    fs::write(&dockerfile, &recipe)
        .await
        .map_err(|e| MuleError::io(format!("writing {}", dockerfile.display()), e))?;

    let tag = image_tag(&entry.host_dir);
    ctx.engine
        .build(&BuildRequest {
            dockerfile,
            context: scratch.clone(),
            tag: tag.clone(),
            builder: ctx.builder.clone(),
        })
        .await?;

    info!("Extracting '{}' ({:?} mode)", entry.host_dir, ctx.sync);

    // The strategy result is decided before cleanup runs, and cleanup runs
    // on both arms: a failed removal must not replace the real outcome.
    match ctx.sync {
        SyncMode::Cp => {
            let container = container_name(&entry.host_dir);
            let result = copy_out(entry, ctx, &scratch, &tag, &container).await;
            cleanup(ctx.engine, &tag, Some(&container)).await;
            result
        }
        SyncMode::Rsync => {
            let result = bind_sync(entry, ctx, &tag).await;
            cleanup(ctx.engine, &tag, None).await;
            result
        }
    }
}

/// Bulk-copy strategy: materialize a container from the helper image,
/// stream the staging path out, then swap it into place as the host
/// directory.
async fn copy_out(
    entry: &CacheMapEntry,
    ctx: &TransferContext<'_>,
    scratch: &Path,
    tag: &str,
    container: &str,
) -> MuleResult<()> {
    ctx.engine.create_container(container, tag).await?;

    let unpacked = scratch.join("extracted");
    fs::create_dir_all(&unpacked)
        .await
        .map_err(|e| MuleError::io(format!("creating {}", unpacked.display()), e))?;

    ctx.engine
        .copy_from_container(container, &format!("{STAGE_DIR}/."), &unpacked)
        .await?;

    swap_into_place(&unpacked, &ctx.work_root.join(&entry.host_dir)).await
}

/// Differential strategy: run the helper image with the host directory
/// bind-mounted in and mirror the staging path onto it. Deletes host-side
/// files no longer present in the cache mount.
async fn bind_sync(entry: &CacheMapEntry, ctx: &TransferContext<'_>, tag: &str) -> MuleResult<()> {
    let host_dir = ctx.work_root.join(&entry.host_dir);
    fs::create_dir_all(&host_dir)
        .await
        .map_err(|e| MuleError::io(format!("creating {}", host_dir.display()), e))?;

    let absolute = absolute_path(&host_dir)?;
    let command = vec![
        "rsync".to_string(),
        "-a".to_string(),
        "--delete".to_string(),
        format!("{STAGE_DIR}/"),
        format!("{HOST_BIND}/"),
    ];

    ctx.engine
        .run_with_bind(tag, &absolute, HOST_BIND, &command)
        .await
}

/// Replace the host directory with freshly extracted content in one rename.
async fn swap_into_place(unpacked: &Path, host_dir: &Path) -> MuleResult<()> {
    if let Some(parent) = host_dir.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| MuleError::io(format!("creating {}", parent.display()), e))?;
        }
    }

    remove_dir_if_exists(host_dir).await?;
    fs::rename(unpacked, host_dir).await.map_err(|e| {
        MuleError::io(
            format!("moving extracted data into {}", host_dir.display()),
            e,
        )
    })
}

/// Absolute form of a host path, required for engine bind mounts.
fn absolute_path(path: &Path) -> MuleResult<PathBuf> {
    std::path::absolute(path)
        .map_err(|e| MuleError::io(format!("resolving {}", path.display()), e))
}
