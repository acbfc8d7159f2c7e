//! cachemule - save and restore BuildKit RUN cache mounts
//!
//! BuildKit discards `RUN --mount=type=cache` volumes when a build finishes.
//! cachemule moves their contents between the CI runner's persistent cache
//! storage and the build-time mounts, in both directions, through throwaway
//! helper image builds.

pub mod cachemap;
pub mod cli;
pub mod engine;
pub mod error;
pub mod safety;
pub mod transfer;

pub use error::{MuleError, MuleResult};
