// ABOUTME: Application-wide error types for glaukos.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to connect to container runtime: {0}")]
    RuntimeConnection(String),

    #[error(transparent)]
    Promote(#[from] crate::promote::PromoteError),

    #[error(transparent)]
    Store(#[from] crate::proxy::StoreError),

    #[error("rollback is not implemented; run `glaukos promote` to switch colors explicitly")]
    RollbackUnimplemented,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
