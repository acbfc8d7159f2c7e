//! Static Dockerfile cache-mount scanner
//!
//! Not a Dockerfile parser. The only thing read out of the file is the set
//! of `--mount=type=cache,...` flags on `RUN` instructions, which is enough
//! to reconstruct the cache identities a build will use.

use crate::error::{MuleError, MuleResult};
use tracing::debug;

/// A cache mount discovered on a `RUN` instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredMount {
    /// The identity BuildKit uses to persist this mount's backing volume.
    pub identity: String,
}

/// Scan Dockerfile text for `RUN` cache-mount flags.
///
/// The identity of each mount is its explicit `id` option when set, else its
/// `target` path. This mirrors BuildKit's own default-identity rule and must
/// stay in lockstep with it: deriving a different identity here would address
/// a different cache volume than the one the real build populated, and
/// extraction would silently come back empty.
pub fn scan_cache_mounts(content: &str) -> MuleResult<Vec<DiscoveredMount>> {
    let mut mounts = Vec::new();

    for instruction in join_continuations(content) {
        let Some(rest) = strip_run_prefix(&instruction) else {
            continue;
        };

        for token in rest.split_whitespace() {
            let Some(flag) = token.strip_prefix("--mount=") else {
                continue;
            };

            let mut mount_type = None;
            let mut id = None;
            let mut target = None;
            for pair in flag.split(',') {
                match pair.split_once('=') {
                    Some(("type", v)) => mount_type = Some(v),
                    Some(("id", v)) => id = Some(v),
                    Some(("target", v)) | Some(("dst", v)) | Some(("destination", v)) => {
                        target = Some(v)
                    }
                    _ => {}
                }
            }

            if mount_type != Some("cache") {
                continue;
            }

            let identity = id.or(target).ok_or_else(|| MuleError::MountFlagIncomplete {
                mount: token.to_string(),
            })?;

            debug!("Discovered cache mount: identity={}", identity);
            mounts.push(DiscoveredMount {
                identity: identity.to_string(),
            });
        }
    }

    Ok(mounts)
}

/// Merge backslash-continued lines into whole instructions, dropping comments.
fn join_continuations(content: &str) -> Vec<String> {
    let mut instructions = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            continue;
        }

        if let Some(stripped) = trimmed.strip_suffix('\\') {
            current.push_str(stripped);
            current.push(' ');
        } else {
            current.push_str(trimmed);
            instructions.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        instructions.push(current);
    }

    instructions
}

/// Return the arguments of a `RUN` instruction, or None for anything else.
fn strip_run_prefix(instruction: &str) -> Option<&str> {
    let (head, rest) = instruction.split_once(char::is_whitespace)?;
    head.eq_ignore_ascii_case("RUN").then_some(rest)
}
