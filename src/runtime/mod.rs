// ABOUTME: Container runtime abstraction over Docker and Podman.
// ABOUTME: Traits for lifecycle and images, plus the bollard implementation.

mod bollard;
mod traits;

pub use bollard::{BollardRuntime, DEFAULT_SOCKET};
pub use traits::{
    ContainerError, ContainerInfo, ContainerOps, ContainerSpec, ContainerState, ImageError,
    ImageOps,
};
