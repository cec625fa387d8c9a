// ABOUTME: Error taxonomy for promotion runs.
// ABOUTME: Every variant is fatal and only reachable before the traffic switch commits.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::environment::EnvironmentError;
use crate::health::HealthError;
use crate::proxy::{StoreError, SwitchError};

/// Fatal promotion failures. All of these abort the run with the original
/// active color still serving; post-switch problems are warnings instead
/// and never appear here.
#[derive(Debug, Error)]
pub enum PromoteError {
    #[error(
        "another promotion is already running: lock held by {holder} (pid {pid}) since {since}"
    )]
    LockHeld {
        holder: String,
        pid: u32,
        since: DateTime<Utc>,
    },

    #[error("promotion lock error: {0}")]
    Lock(String),

    /// Covers AmbiguousConfig and read failures while resolving colors.
    #[error("failed to resolve active color: {0}")]
    Resolve(#[source] StoreError),

    #[error("failed to start standby environment: {0}")]
    StandbyStart(#[source] EnvironmentError),

    #[error(transparent)]
    HealthGate(#[from] HealthError),

    /// Covers ConfigWriteFailure and ReloadFailure (config restored).
    #[error(transparent)]
    Switch(#[from] SwitchError),

    #[error("promotion interrupted before the switch; active color unchanged")]
    Interrupted,
}
