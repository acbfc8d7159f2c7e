//! Docker CLI engine
//!
//! Implements the `ContainerEngine` trait by shelling out to `docker`.
//! BuildKit must be available through the buildx plugin; cache mounts do
//! not exist in the legacy builder.

use crate::engine::{BuildRequest, ContainerEngine};
use crate::error::{MuleError, MuleResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Container engine backed by the `docker` command-line client
pub struct DockerCli {
    binary: String,
}

impl DockerCli {
    /// Create a new Docker CLI engine
    pub fn new() -> Self {
        Self {
            binary: "docker".to_string(),
        }
    }

    /// Use an alternative client binary (e.g. a wrapper script in tests)
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Execute a docker command and return the output
    async fn exec(&self, args: &[&str]) -> MuleResult<std::process::Output> {
        debug!("Executing: {} {:?}", self.binary, args);

        Command::new(&self.binary)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| MuleError::command_failed(format!("{} {:?}", self.binary, args), e))
    }

    /// Execute a docker command, mapping a non-zero exit to an error
    async fn exec_checked(&self, args: &[&str]) -> MuleResult<std::process::Output> {
        let output = self.exec(args).await?;
        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(MuleError::command_exec(
                format!("{} {}", self.binary, args.join(" ")),
                stderr,
            ))
        }
    }

    async fn docker_installed(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn buildx_available(&self) -> bool {
        Command::new(&self.binary)
            .args(["buildx", "version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn ensure_ready(&self) -> MuleResult<()> {
        if !self.docker_installed().await {
            return Err(MuleError::DockerNotFound);
        }
        if !self.buildx_available().await {
            return Err(MuleError::BuildxNotFound);
        }
        Ok(())
    }

    async fn build(&self, request: &BuildRequest) -> MuleResult<()> {
        let dockerfile = request.dockerfile.display().to_string();
        let context = request.context.display().to_string();

        // --load lands the image in the local store so the copy-out
        // strategy can create a container from it.
        self.exec_checked(&[
            "buildx",
            "build",
            "--builder",
            &request.builder,
            "-f",
            &dockerfile,
            "--tag",
            &request.tag,
            "--load",
            &context,
        ])
        .await?;
        Ok(())
    }

    async fn create_container(&self, name: &str, image: &str) -> MuleResult<()> {
        // A leftover container from an interrupted run would collide on the
        // deterministic name; clear it first.
        let _ = self.exec(&["rm", "-f", name]).await;
        self.exec_checked(&["container", "create", "--name", name, image])
            .await?;
        Ok(())
    }

    async fn copy_from_container(
        &self,
        container: &str,
        container_path: &str,
        host_dest: &Path,
    ) -> MuleResult<()> {
        let source = format!("{container}:{container_path}");
        let dest = host_dest.display().to_string();
        self.exec_checked(&["cp", &source, &dest]).await?;
        Ok(())
    }

    async fn run_with_bind(
        &self,
        image: &str,
        host_dir: &Path,
        bind_target: &str,
        command: &[String],
    ) -> MuleResult<()> {
        let bind = format!("{}:{}", host_dir.display(), bind_target);

        let mut args = vec!["run", "--rm", "-v", bind.as_str(), image];
        args.extend(command.iter().map(String::as_str));

        self.exec_checked(&args).await?;
        Ok(())
    }

    async fn remove_container(&self, name: &str) -> MuleResult<()> {
        let output = self.exec(&["rm", "-f", name]).await?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.to_lowercase().contains("no such container") {
            Ok(())
        } else {
            Err(MuleError::command_exec("docker rm", stderr))
        }
    }

    async fn remove_image(&self, tag: &str) -> MuleResult<()> {
        let output = self.exec(&["rmi", "--force", tag]).await?;
        if output.status.success() {
            return Ok(());
        }
        // A failed build leaves no image behind; removing it anyway is fine.
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.to_lowercase().contains("no such image") {
            Ok(())
        } else {
            Err(MuleError::command_exec("docker rmi", stderr))
        }
    }

    fn engine_name(&self) -> &'static str {
        "Docker"
    }
}
