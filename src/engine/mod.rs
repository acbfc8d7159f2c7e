//! Container engine collaborator
//!
//! Every data movement in cachemule goes through a container engine:
//! helper image builds, throwaway container creation, streaming copies,
//! and cleanup removals. The engine is a trait so the transfer engine can
//! be exercised against a fake in tests.

mod docker;

pub use docker::DockerCli;

use crate::error::MuleResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A helper image build request.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Path to the synthesized Dockerfile
    pub dockerfile: PathBuf,
    /// Build context directory
    pub context: PathBuf,
    /// Tag for the throwaway image
    pub tag: String,
    /// buildx builder instance to use
    pub builder: String,
}

/// Abstract container engine interface.
///
/// Each call is one external-process invocation; a non-zero exit status is
/// an error for the current cache entry.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Ensure the engine and its build backend are usable
    async fn ensure_ready(&self) -> MuleResult<()>;

    /// Build a helper image and load it into the local image store
    async fn build(&self, request: &BuildRequest) -> MuleResult<()>;

    /// Create (without starting) a container from an image
    async fn create_container(&self, name: &str, image: &str) -> MuleResult<()>;

    /// Stream-copy a path out of a container into a host directory
    async fn copy_from_container(
        &self,
        container: &str,
        container_path: &str,
        host_dest: &Path,
    ) -> MuleResult<()>;

    /// Run a one-shot container with a host directory bind-mounted in
    async fn run_with_bind(
        &self,
        image: &str,
        host_dir: &Path,
        bind_target: &str,
        command: &[String],
    ) -> MuleResult<()>;

    /// Remove a container, tolerating its absence
    async fn remove_container(&self, name: &str) -> MuleResult<()>;

    /// Remove an image
    async fn remove_image(&self, tag: &str) -> MuleResult<()>;

    /// Human-readable engine name for diagnostics
    fn engine_name(&self) -> &'static str;
}
