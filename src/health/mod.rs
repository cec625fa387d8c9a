// ABOUTME: Health gate: polls a standby's liveness endpoint until healthy.
// ABOUTME: Bounded attempts; observations are never cached across promotion runs.

mod probe;

pub use probe::{ProbeResult, http_probe};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::config::HealthConfig;
use crate::retry::{RetryPolicy, retry};
use crate::types::Color;

/// Observed health of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

/// A health status with the moment it was observed. Valid only within
/// the promotion run that produced it.
#[derive(Debug, Clone, Copy)]
pub struct HealthObservation {
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
}

impl HealthObservation {
    pub fn now(status: HealthStatus) -> Self {
        Self {
            status,
            checked_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("{color} did not become healthy within {attempts} attempts")]
    Timeout { color: Color, attempts: u32 },
}

/// Polls an environment's liveness endpoint until it answers 2xx or the
/// attempt cap is exhausted.
pub struct HealthGate {
    config: HealthConfig,
}

impl HealthGate {
    pub fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    /// Block until `color` at `address` reports healthy. Succeeds on the
    /// first 2xx; a reachable non-2xx response burns an attempt like a
    /// connection failure does.
    pub async fn await_healthy(
        &self,
        color: Color,
        address: &str,
    ) -> Result<HealthObservation, HealthError> {
        let policy = RetryPolicy::new(self.config.max_attempts, self.config.interval);
        let path = self.config.path.as_str();
        let timeout = self.config.timeout;

        let outcome = retry(policy, |attempt| async move {
            match http_probe(address, path, timeout).await {
                ProbeResult::Healthy => Ok(()),
                ProbeResult::Unhealthy => Err(format!(
                    "{color} liveness attempt {attempt}: endpoint answered non-2xx"
                )),
                ProbeResult::Failed => Err(format!(
                    "{color} liveness attempt {attempt}: endpoint unreachable"
                )),
            }
        })
        .await;

        match outcome {
            Ok(()) => {
                info!(%color, %address, "environment is healthy");
                Ok(HealthObservation::now(HealthStatus::Healthy))
            }
            Err(exhausted) => Err(HealthError::Timeout {
                color,
                attempts: exhausted.attempts,
            }),
        }
    }
}
