// ABOUTME: Container runtime traits: lifecycle, signaling, and image pulls.
// ABOUTME: Signals stand in for shell-level process control (SIGTERM/SIGKILL/SIGHUP).

use crate::types::{ContainerId, ImageRef};
use async_trait::async_trait;
use std::collections::HashMap;

/// Container lifecycle operations.
///
/// `signal_container` is the single stop/kill/reload primitive: graceful
/// stop is the configured stop signal, forced termination is SIGKILL, and
/// a proxy reload is SIGHUP. Waiting for exit is the caller's concern
/// (bounded polling over `inspect_container`).
#[async_trait]
pub trait ContainerOps: Send + Sync {
    /// Create a container from the given spec. Does not start it.
    async fn create_container(&self, spec: &ContainerSpec) -> Result<ContainerId, ContainerError>;

    /// Start a created container.
    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError>;

    /// Deliver a signal ("SIGTERM", "SIGKILL", "SIGHUP", ...) to the
    /// container's main process. Does not wait for any effect.
    async fn signal_container(&self, id: &ContainerId, signal: &str)
    -> Result<(), ContainerError>;

    /// Remove a container.
    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError>;

    /// Get current state and metadata for a container.
    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerInfo, ContainerError>;

    /// Look up a container by name; `None` if it does not exist.
    async fn find_container(&self, name: &str) -> Result<Option<ContainerInfo>, ContainerError>;
}

/// Image operations needed to (re)build an environment.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Pull the image from its registry.
    async fn pull_image(&self, image: &ImageRef) -> Result<(), ImageError>;
}

/// Everything needed to create an environment container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: ImageRef,
    pub env: HashMap<String, String>,
    pub labels: HashMap<String, String>,
}

/// Detailed information about a container.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub id: ContainerId,
    pub name: String,
    pub state: ContainerState,
    pub labels: HashMap<String, String>,
}

/// Container runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
}

impl ContainerState {
    pub fn is_running(self) -> bool {
        matches!(self, ContainerState::Running)
    }
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container already exists: {0}")]
    AlreadyExists(String),

    #[error("container not running: {0}")]
    NotRunning(String),

    #[error("container already running: {0}")]
    AlreadyRunning(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to pull image: {0}")]
    PullFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
