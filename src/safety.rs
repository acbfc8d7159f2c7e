//! Path and name safety checks
//!
//! Every host path and every value interpolated into a generated Dockerfile
//! passes through this module first. These are pure functions with no state.

use crate::error::{MuleError, MuleResult};
use std::path::{Component, Path};

/// Characters that must never reach generated Dockerfile text.
///
/// Values checked here are interpolated verbatim into `RUN` instructions,
/// so this is an injection gate, not cosmetic validation.
const SHELL_METACHARACTERS: &[char] = &[
    ';', '|', '&', '$', '`', '\\', '\'', '"', '<', '>', '(', ')', '{', '}', '[', ']', '!', '#',
    '*', '?', '~',
];

/// Validate that a path is relative and contains no parent-directory traversal.
///
/// Operates on the path's real components, so non-UTF-8 paths are checked
/// as-is; the error message is the only place they are rendered lossily.
pub fn validate_relative_path(path: impl AsRef<Path>) -> MuleResult<()> {
    let p = path.as_ref();
    let shown = p.display().to_string();

    if p.as_os_str().is_empty() {
        return Err(MuleError::unsafe_path(shown, "empty path"));
    }

    if p.is_absolute() {
        return Err(MuleError::unsafe_path(shown, "absolute paths are not allowed"));
    }

    for component in p.components() {
        match component {
            Component::ParentDir => {
                return Err(MuleError::unsafe_path(
                    shown,
                    "parent-directory traversal is not allowed",
                ));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(MuleError::unsafe_path(shown, "absolute paths are not allowed"));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

/// Reject any value containing shell metacharacters.
pub fn reject_shell_metacharacters(value: &str) -> MuleResult<()> {
    if value.contains(SHELL_METACHARACTERS) {
        return Err(MuleError::ForbiddenCharacters {
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Derive a deterministic, name-safe token from a host path.
///
/// Every character outside `[A-Za-z0-9]` becomes `-`, runs collapse to one,
/// leading/trailing separators are trimmed, and the result is lower-cased.
/// The same path always yields the same token, so repeated runs address the
/// same ephemeral image and container names. Derived from the full host path
/// (not just the cache identity) so distinct cache entries processed in one
/// invocation never share an image name.
pub fn unique_suffix(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_was_sep = true; // trims leading separators

    for c in path.chars() {
        if c.is_ascii_alphanumeric() {
            out.extend(c.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('-');
            last_was_sep = true;
        }
    }

    if out.ends_with('-') {
        out.pop();
    }
    out
}

/// Strip a path to its final normal component.
///
/// Used when turning configured keys and derived cache identities into
/// host-side directory names, so adversarial input like `../../etc` or
/// `/var/a/b` can only ever name a single directory under the cache root.
pub fn base_component(path: &str) -> MuleResult<&str> {
    Path::new(path)
        .components()
        .rev()
        .find_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .ok_or_else(|| MuleError::unsafe_path(path, "no usable path component"))
}
