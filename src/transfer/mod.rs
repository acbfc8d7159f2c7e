//! Transfer engine
//!
//! Moves data between host cache directories and BuildKit cache mounts.
//! Each cache map entry gets one ephemeral build unit: a synthesized
//! recipe, a throwaway image, and (in bulk-copy extraction) a throwaway
//! container, all destroyed before the entry's processing returns.

mod extract;
mod inject;
pub mod orchestrator;
pub mod recipe;

pub use extract::extract_one;
pub use inject::inject_one;
pub use orchestrator::{run_extraction, run_injection, TransferConfig};
pub use recipe::SyncMode;

use crate::engine::ContainerEngine;
use crate::error::{MuleError, MuleResult};
use crate::safety::{reject_shell_metacharacters, validate_relative_path};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// Shared state for processing the entries of one invocation.
pub struct TransferContext<'a> {
    /// Container engine to drive
    pub engine: &'a dyn ContainerEngine,
    /// Working root that all relative host paths are resolved against
    pub work_root: PathBuf,
    /// Scratch workspace relative to the working root, recreated empty for
    /// every entry
    pub scratch_root: PathBuf,
    /// Utility base image for helper builds
    pub image: String,
    /// buildx builder instance name
    pub builder: String,
    /// Data movement strategy
    pub sync: SyncMode,
}

/// Safety gates shared by both transfer directions.
///
/// Host paths must stay inside the working root, and everything that is
/// interpolated into a generated recipe must be free of shell
/// metacharacters.
fn validate_entry(host_dir: &str, scratch_root: &Path, mount_args: &str) -> MuleResult<()> {
    validate_relative_path(host_dir)?;
    validate_relative_path(scratch_root)?;
    reject_shell_metacharacters(mount_args)?;
    Ok(())
}

/// Remove a directory tree, tolerating its absence.
async fn remove_dir_if_exists(path: &Path) -> MuleResult<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MuleError::io(format!("removing {}", path.display()), e)),
    }
}

/// Recreate a directory empty.
async fn recreate_dir(path: &Path) -> MuleResult<()> {
    remove_dir_if_exists(path).await?;
    fs::create_dir_all(path)
        .await
        .map_err(|e| MuleError::io(format!("creating {}", path.display()), e))
}

/// Remove ephemeral build resources for one entry.
///
/// Runs on every exit path. Removal failures must never mask the real
/// transfer result, so they are logged and discarded here.
async fn cleanup(engine: &dyn ContainerEngine, tag: &str, container: Option<&str>) {
    if let Some(name) = container {
        if let Err(e) = engine.remove_container(name).await {
            warn!("Failed to remove container {}: {}", name, e);
        }
    }
    if let Err(e) = engine.remove_image(tag).await {
        warn!("Failed to remove image {}: {}", tag, e);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::cachemap::{CacheMapEntry, CacheOptions};
    use tempfile::TempDir;

    fn entry(host_dir: &str, options: CacheOptions) -> CacheMapEntry {
        CacheMapEntry {
            host_dir: host_dir.to_string(),
            options,
        }
    }

    fn context<'a>(
        engine: &'a fake::FakeEngine,
        root: &Path,
        sync: SyncMode,
    ) -> TransferContext<'a> {
        TransferContext {
            engine,
            work_root: root.to_path_buf(),
            scratch_root: PathBuf::from("scratch"),
            image: "ubuntu:latest".to_string(),
            builder: "default".to_string(),
            sync,
        }
    }

    async fn round_trip(sync: SyncMode) -> (TempDir, fake::FakeEngine) {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("go-mod/cache/download")).unwrap();
        std::fs::write(temp.path().join("go-mod/cache/download/mod.zip"), "bytes").unwrap();

        let engine = fake::FakeEngine::default();
        let ctx = context(&engine, temp.path(), sync);
        let e = entry("go-mod", CacheOptions::Target("/go/pkg/mod".to_string()));

        inject_one(&e, &ctx).await.unwrap();
        // the host directory is reset once its contents live in the volume
        assert_eq!(
            std::fs::read_dir(temp.path().join("go-mod")).unwrap().count(),
            0
        );

        extract_one(&e, &ctx).await.unwrap();
        (temp, engine)
    }

    #[tokio::test]
    async fn inject_then_extract_round_trips_cp() {
        let (temp, _) = round_trip(SyncMode::Cp).await;
        assert_eq!(
            std::fs::read_to_string(temp.path().join("go-mod/cache/download/mod.zip")).unwrap(),
            "bytes"
        );
    }

    #[tokio::test]
    async fn inject_then_extract_round_trips_rsync() {
        let (temp, _) = round_trip(SyncMode::Rsync).await;
        assert_eq!(
            std::fs::read_to_string(temp.path().join("go-mod/cache/download/mod.zip")).unwrap(),
            "bytes"
        );
    }

    #[tokio::test]
    async fn round_trip_keyed_by_id_over_target() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("go-mod")).unwrap();
        std::fs::write(temp.path().join("go-mod/f"), "C").unwrap();

        let engine = fake::FakeEngine::default();
        let ctx = context(&engine, temp.path(), SyncMode::Cp);

        // Same id, different targets: BuildKit addresses the volume by id,
        // so the data must still come back.
        let mut extra = serde_json::Map::new();
        extra.insert("id".to_string(), serde_json::Value::String("gomod".into()));
        let inject_entry = entry("go-mod", CacheOptions::structured("/a", extra.clone()));
        let extract_entry = entry("go-mod", CacheOptions::structured("/b", extra));

        inject_one(&inject_entry, &ctx).await.unwrap();
        extract_one(&extract_entry, &ctx).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(temp.path().join("go-mod/f")).unwrap(),
            "C"
        );
    }

    #[tokio::test]
    async fn distinct_targets_do_not_share_data() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("apt")).unwrap();
        std::fs::write(temp.path().join("apt/pkg.deb"), "deb").unwrap();

        let engine = fake::FakeEngine::default();
        let ctx = context(&engine, temp.path(), SyncMode::Cp);

        inject_one(&entry("apt", CacheOptions::Target("/var/cache/apt".into())), &ctx)
            .await
            .unwrap();
        extract_one(&entry("apt", CacheOptions::Target("/var/lib/apt".into())), &ctx)
            .await
            .unwrap();

        // Different target, no id: a different volume, so nothing comes out.
        assert_eq!(
            std::fs::read_dir(temp.path().join("apt")).unwrap().count(),
            0
        );
    }

    #[tokio::test]
    async fn recreate_dir_clears_contents() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("scratch");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stale"), "old").unwrap();

        recreate_dir(&dir).await.unwrap();

        assert!(dir.exists());
        assert!(!dir.join("stale").exists());
    }

    #[tokio::test]
    async fn remove_missing_dir_ok() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(remove_dir_if_exists(&temp.path().join("absent")).await.is_ok());
    }

    #[test]
    fn validate_entry_gates() {
        assert!(validate_entry("go-mod", Path::new("scratch"), "type=cache,target=/t").is_ok());
        assert!(validate_entry("/abs", Path::new("scratch"), "type=cache,target=/t").is_err());
        assert!(validate_entry("go-mod", Path::new("/abs"), "type=cache,target=/t").is_err());
        assert!(validate_entry("go-mod", Path::new("scratch"), "type=cache,target=/t$(x)").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn validate_entry_checks_raw_scratch_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let traversal = Path::new(OsStr::from_bytes(b"../sc\xffratch"));
        assert!(validate_entry("go-mod", traversal, "type=cache,target=/t").is_err());
    }
}
