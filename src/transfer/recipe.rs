//! Helper build recipe synthesis
//!
//! Each cache entry gets a tiny generated Dockerfile: one to pull a cache
//! mount's contents into a staging path, one to push host data into a cache
//! mount. Every interpolated value is checked by the safety layer before it
//! reaches these templates.

use crate::safety::unique_suffix;
use chrono::Utc;
use std::path::Path;
use tokio::fs;

use crate::error::{MuleError, MuleResult};

/// Container-internal staging path the extraction build copies into.
pub const STAGE_DIR: &str = "/cachemule-stage";

/// Bind-mount target for the host directory during injection builds.
pub const SOURCE_DIR: &str = "/cachemule-src";

/// Bind-mount target for the host directory in differential extraction.
pub const HOST_BIND: &str = "/cachemule-host";

/// Name of the cache-busting stamp file copied into every helper build.
pub const STAMP_FILE: &str = ".cachemule-stamp";

/// Data movement strategy for one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SyncMode {
    /// Bulk copy through a throwaway container; image-agnostic
    Cp,
    /// Differential sync; needs rsync in the utility image
    Rsync,
}

/// Throwaway image tag for a host directory.
pub fn image_tag(host_dir: &str) -> String {
    format!("cachemule-{}", unique_suffix(host_dir))
}

/// Throwaway container name for a host directory (bulk-copy extraction only).
pub fn container_name(host_dir: &str) -> String {
    format!("cachemule-ctr-{}", unique_suffix(host_dir))
}

/// Write the cache-busting stamp into `dir`.
///
/// The stamp changes every run, so BuildKit's layer cache can never serve a
/// stale staged copy of the cache mount from a previous invocation.
pub async fn write_bust_stamp(dir: &Path) -> MuleResult<()> {
    let path = dir.join(STAMP_FILE);
    fs::write(&path, Utc::now().to_rfc3339())
        .await
        .map_err(|e| MuleError::io(format!("writing stamp {}", path.display()), e))
}

/// Synthesize the extraction recipe: mount the cache and copy its contents
/// into [`STAGE_DIR`].
///
/// The trailing `|| true` tolerates a cache mount that has never been
/// populated; an empty cache is not an error.
pub fn extraction_recipe(image: &str, mount_args: &str, target: &str) -> String {
    format!(
        "FROM {image}\n\
         COPY {STAMP_FILE} /cachemule-stamp\n\
         RUN --mount={mount_args} mkdir -p {STAGE_DIR} && cp -p -R {target}/. {STAGE_DIR}/ || true\n"
    )
}

/// Synthesize the injection recipe: mount the cache, bind-mount the host
/// directory (the build context), and copy host data into the mount target.
///
/// The build itself performs the injection; BuildKit executes the copy with
/// the real cache volume mounted. In `Rsync` mode files already present in
/// the mount are kept, so state from an earlier partial injection is
/// preserved rather than clobbered.
pub fn injection_recipe(
    image: &str,
    mount_args: &str,
    target: &str,
    uid_gid: Option<(&str, &str)>,
    sync: SyncMode,
) -> String {
    let copy = match sync {
        SyncMode::Cp => format!("cp -p -R {SOURCE_DIR}/. {target}/"),
        SyncMode::Rsync => format!("rsync -r --ignore-existing {SOURCE_DIR}/ {target}/"),
    };

    let chown = match uid_gid {
        Some((uid, gid)) => format!(" && chown -R {uid}:{gid} {target}"),
        None => String::new(),
    };

    format!(
        "FROM {image}\n\
         COPY {STAMP_FILE} /cachemule-stamp\n\
         RUN --mount={mount_args} --mount=type=bind,source=.,target={SOURCE_DIR} {copy}{chown}\n"
    )
}
