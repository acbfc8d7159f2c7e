//! Cache map resolution
//!
//! Turns raw configuration (or a scanned Dockerfile) into the validated,
//! prefixed mapping of host directories to cache mount options that the
//! transfer engine iterates. Resolution happens once per invocation; the
//! resolved map is immutable afterward.

use crate::cachemap::dockerfile::scan_cache_mounts;
use crate::cachemap::options::CacheOptions;
use crate::error::{MuleError, MuleResult};
use crate::safety::{base_component, validate_relative_path};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Sentinel container path emitted for auto-discovered entries.
///
/// BuildKit resolves a discovered mount by its identity, so the target on
/// these entries never matters. It only has to differ from the transfer
/// engine's internal staging path so the two can never alias.
pub const SENTINEL_TARGET: &str = "/cachemule-sentinel";

/// One resolved cache map entry: a safe host-relative directory plus the
/// mount options addressing its cache volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheMapEntry {
    /// Host-side directory, relative to the working root
    pub host_dir: String,
    /// Mount options for the cache volume backing this directory
    pub options: CacheOptions,
}

/// Resolve the cache map from raw JSON configuration or, when the
/// configuration is empty, from a static scan of the build file.
///
/// Every returned host path is guaranteed relative and free of
/// parent-directory traversal, whatever the input looked like.
pub async fn resolve(
    raw_config: &str,
    cache_root: Option<&str>,
    build_file: &Path,
) -> MuleResult<Vec<CacheMapEntry>> {
    let configured = parse_raw_config(raw_config)?;

    let entries = match configured {
        Some(map) => resolve_configured(map, cache_root)?,
        None => resolve_from_build_file(build_file, cache_root).await?,
    };

    for entry in &entries {
        validate_relative_path(&entry.host_dir)?;
    }

    debug!(
        "Resolved cache map: {}",
        serde_json::to_string(&entries).unwrap_or_default()
    );
    Ok(entries)
}

/// Parse raw configuration. `None` means empty, which triggers build-file
/// auto-discovery; anything else must be a JSON object.
fn parse_raw_config(raw: &str) -> MuleResult<Option<serde_json::Map<String, Value>>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| MuleError::config(format!("not valid JSON: {e}")))?;

    match value {
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(MuleError::config(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn resolve_configured(
    map: serde_json::Map<String, Value>,
    cache_root: Option<&str>,
) -> MuleResult<Vec<CacheMapEntry>> {
    let mut entries = Vec::with_capacity(map.len());

    for (key, value) in map {
        let options = CacheOptions::from_value(&key, value)?;

        let host_dir = match cache_root {
            Some(root) => {
                let base = base_component(&key)?;
                if base != key {
                    warn!("Cache map key '{}' stripped to '{}'", key, base);
                }
                format!("{root}/{base}")
            }
            None => key,
        };

        entries.push(CacheMapEntry { host_dir, options });
    }

    Ok(entries)
}

async fn resolve_from_build_file(
    build_file: &Path,
    cache_root: Option<&str>,
) -> MuleResult<Vec<CacheMapEntry>> {
    debug!(
        "Empty cache map, scanning build file {}",
        build_file.display()
    );

    let content = fs::read_to_string(build_file)
        .await
        .map_err(|e| MuleError::BuildFileRead {
            path: build_file.to_path_buf(),
            source: e,
        })?;

    let mut entries: Vec<CacheMapEntry> = Vec::new();

    for mount in scan_cache_mounts(&content)? {
        // Identity may be a container path like /go/pkg/mod. Only its base
        // component becomes the host directory name.
        let base = base_component(&mount.identity)?.to_string();
        let host_dir = match cache_root {
            Some(root) => format!("{root}/{base}"),
            None => base,
        };

        if entries.iter().any(|e| e.host_dir == host_dir) {
            debug!("Skipping duplicate cache mount for '{}'", host_dir);
            continue;
        }

        let mut extra = serde_json::Map::new();
        extra.insert("id".to_string(), Value::String(mount.identity));
        entries.push(CacheMapEntry {
            host_dir,
            options: CacheOptions::structured(SENTINEL_TARGET, extra),
        });
    }

    Ok(entries)
}
