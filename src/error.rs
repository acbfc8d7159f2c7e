//! Error types for cachemule
//!
//! All modules use `MuleResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cachemule operations
pub type MuleResult<T> = Result<T, MuleError>;

/// All errors that can occur in cachemule
#[derive(Error, Debug)]
pub enum MuleError {
    // Environment errors
    #[error("Docker not found. Install Docker and ensure it is on PATH.")]
    DockerNotFound,

    #[error("Docker buildx is not available. Install the buildx plugin or upgrade Docker.")]
    BuildxNotFound,

    // Configuration errors
    #[error("Invalid cache map: {reason}")]
    ConfigInvalid { reason: String },

    #[error("Cache map entry '{key}' is missing the required 'target' field")]
    ConfigMissingTarget { key: String },

    // Path safety errors
    #[error("Unsafe path '{path}': {reason}")]
    UnsafePath { path: String, reason: String },

    #[error("Forbidden characters in '{value}': shell metacharacters are not allowed")]
    ForbiddenCharacters { value: String },

    // Build-file scan errors
    #[error("Cache mount flag has neither 'id' nor 'target': {mount}")]
    MountFlagIncomplete { mount: String },

    #[error("Failed to read build file {path}: {source}")]
    BuildFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Engine errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MuleError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            reason: reason.into(),
        }
    }

    /// Create an unsafe path error
    pub fn unsafe_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsafePath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DockerNotFound => Some("Install Docker from https://docs.docker.com/get-docker"),
            Self::BuildxNotFound => Some("Run: docker buildx version"),
            Self::ConfigInvalid { .. } => {
                Some("Pass a JSON object, e.g. {\"go-mod\":{\"target\":\"/go/pkg/mod\"}}")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MuleError::ConfigMissingTarget {
            key: "go-mod".to_string(),
        };
        assert!(err.to_string().contains("go-mod"));
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn error_hint() {
        let err = MuleError::DockerNotFound;
        assert!(err.hint().unwrap().contains("docker"));
        let no_hint = MuleError::ForbiddenCharacters {
            value: "x".to_string(),
        };
        assert!(no_hint.hint().is_none());
    }

    #[test]
    fn error_command_exec() {
        let err = MuleError::command_exec("docker rmi x", "no such image");
        assert!(err.to_string().contains("no such image"));
    }
}
