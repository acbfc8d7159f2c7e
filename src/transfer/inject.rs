//! Cache injection: push host cache data into the mount for the next build

use crate::cachemap::CacheMapEntry;
use crate::engine::{BuildRequest, ContainerEngine};
use crate::error::{MuleError, MuleResult};
use crate::transfer::recipe::{image_tag, injection_recipe, write_bust_stamp};
use crate::transfer::{cleanup, recreate_dir, validate_entry, TransferContext};
use tokio::fs;
use tracing::{debug, info, warn};

/// Inject one cache entry: build a helper image whose build step mounts the
/// cache volume and copies the host directory's contents into it. The build
/// itself is the injection; no container ever runs.
pub async fn inject_one(entry: &CacheMapEntry, ctx: &TransferContext<'_>) -> MuleResult<()> {
    let mount_args = entry.options.mount_args();
    validate_entry(&entry.host_dir, &ctx.scratch_root, &mount_args)?;

    let scratch = ctx.work_root.join(&ctx.scratch_root);
    recreate_dir(&scratch).await?;

    // First run has nothing to inject; an empty directory is fine.
    let host_dir = ctx.work_root.join(&entry.host_dir);
    fs::create_dir_all(&host_dir)
        .await
        .map_err(|e| MuleError::io(format!("creating {}", host_dir.display()), e))?;

    // The stamp lives inside the host directory because that directory is
    // the build context for the injection build.
    write_bust_stamp(&host_dir).await?;

    let uid_gid = entry.options.uid_gid();
    let recipe = injection_recipe(
        &ctx.image,
        &mount_args,
        entry.options.target(),
        uid_gid.as_ref().map(|(u, g)| (u.as_str(), g.as_str())),
        ctx.sync,
    );
    debug!("Mount args for '{}': {}", entry.host_dir, mount_args);
    debug!("Injection recipe for '{}':\n{}", entry.host_dir, recipe);

    let dockerfile = scratch.join("Dockerfile");
    fs::write(&dockerfile, &recipe)
        .await
        .map_err(|e| MuleError::io(format!("writing {}", dockerfile.display()), e))?;

    info!("Injecting '{}' ({:?} mode)", entry.host_dir, ctx.sync);

    let tag = image_tag(&entry.host_dir);
    let result = ctx
        .engine
        .build(&BuildRequest {
            dockerfile,
            context: host_dir.clone(),
            tag: tag.clone(),
            builder: ctx.builder.clone(),
        })
        .await;
    cleanup(ctx.engine, &tag, None).await;
    result?;

    // The data now lives in the cache volume. Leave an empty directory
    // behind for the CI cache-save step; a failure here only costs disk
    // space, never the injection itself.
    if let Err(e) = recreate_dir(&host_dir).await {
        warn!("Failed to reset host directory {}: {}", host_dir.display(), e);
    }

    Ok(())
}
