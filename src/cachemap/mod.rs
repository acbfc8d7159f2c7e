//! Cache map resolution
//!
//! Maps host-side cache directories to BuildKit cache-mount identities,
//! either from explicit JSON configuration or by statically scanning a
//! Dockerfile for `RUN --mount=type=cache` flags.

pub mod dockerfile;
mod options;
mod resolver;

pub use dockerfile::DiscoveredMount;
pub use options::{CacheOptions, MountOptions};
pub use resolver::{resolve, CacheMapEntry, SENTINEL_TARGET};
