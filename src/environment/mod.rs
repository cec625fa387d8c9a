// ABOUTME: Environment lifecycle keyed by color: idempotent start, stop, wait, kill.
// ABOUTME: Wraps the container runtime so callers never touch raw container names.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::health::{ProbeResult, http_probe};
use crate::runtime::{ContainerError, ContainerOps, ContainerSpec, ImageError, ImageOps};
use crate::types::{Color, ContainerId};

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("failed to pull image for {color}: {source}")]
    PullFailed { color: Color, source: ImageError },

    #[error("failed to start {color}: {source}")]
    StartFailed {
        color: Color,
        source: ContainerError,
    },

    #[error("no container exists for {0}")]
    NotDeployed(Color),

    #[error("container operation on {color} failed: {source}")]
    Container {
        color: Color,
        source: ContainerError,
    },
}

/// What `start` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The environment was already running and answering its liveness
    /// probe; nothing was rebuilt.
    AlreadyRunning,
    /// A container was (re)created and started.
    Started,
}

/// Whether a drain wait saw the container exit in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitWait {
    Exited,
    TimedOut,
}

/// Starts, stops, signals, and watches the two color environments.
pub struct EnvironmentController<'a, R> {
    config: &'a Config,
    runtime: &'a R,
}

impl<'a, R> EnvironmentController<'a, R>
where
    R: ContainerOps + ImageOps,
{
    pub fn new(config: &'a Config, runtime: &'a R) -> Self {
        Self { config, runtime }
    }

    /// Bring up the environment for `color`, building (pulling) first when
    /// needed. Idempotent: a running container that answers its liveness
    /// probe is left untouched.
    pub async fn start(&self, color: Color) -> Result<StartOutcome, EnvironmentError> {
        let name = self.config.container_name(color);

        let existing = self
            .runtime
            .find_container(&name)
            .await
            .map_err(|source| EnvironmentError::Container { color, source })?;

        if let Some(info) = existing {
            if info.state.is_running() && self.is_live(color).await {
                info!(%color, container = %name, "environment already running and healthy");
                return Ok(StartOutcome::AlreadyRunning);
            }
            // Stale or unhealthy container: replace it wholesale rather
            // than trying to coax it back to life.
            debug!(%color, container = %name, state = ?info.state, "replacing existing container");
            self.runtime
                .remove_container(&info.id, true)
                .await
                .map_err(|source| EnvironmentError::Container { color, source })?;
        }

        self.runtime
            .pull_image(&self.config.image)
            .await
            .map_err(|source| EnvironmentError::PullFailed { color, source })?;

        let spec = self.container_spec(color);
        let id = self
            .runtime
            .create_container(&spec)
            .await
            .map_err(|source| EnvironmentError::StartFailed { color, source })?;

        if let Err(source) = self.runtime.start_container(&id).await {
            // Don't leave a created-but-dead container behind.
            let _ = self.runtime.remove_container(&id, true).await;
            return Err(EnvironmentError::StartFailed { color, source });
        }

        info!(%color, container = %name, "environment started");
        Ok(StartOutcome::Started)
    }

    /// Send the configured graceful-stop signal. Returns without waiting
    /// for exit; pair with `wait_for_exit`.
    pub async fn request_stop(&self, color: Color) -> Result<(), EnvironmentError> {
        let id = self.resolve(color).await?;
        self.runtime
            .signal_container(&id, &self.config.drain.stop_signal)
            .await
            .map_err(|source| EnvironmentError::Container { color, source })?;
        debug!(%color, signal = %self.config.drain.stop_signal, "graceful stop requested");
        Ok(())
    }

    /// Poll until the container is no longer running, bounded by `timeout`.
    pub async fn wait_for_exit(
        &self,
        color: Color,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<ExitWait, EnvironmentError> {
        let id = self.resolve(color).await?;
        let deadline = Instant::now() + timeout;

        loop {
            match self.runtime.inspect_container(&id).await {
                Ok(info) if !info.state.is_running() => return Ok(ExitWait::Exited),
                // A container removed out from under us has certainly exited.
                Err(ContainerError::NotFound(_)) => return Ok(ExitWait::Exited),
                Ok(_) => {}
                Err(source) => return Err(EnvironmentError::Container { color, source }),
            }

            if Instant::now() >= deadline {
                return Ok(ExitWait::TimedOut);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// SIGKILL the environment's container.
    pub async fn force_kill(&self, color: Color) -> Result<(), EnvironmentError> {
        let id = self.resolve(color).await?;
        self.runtime
            .signal_container(&id, "SIGKILL")
            .await
            .map_err(|source| EnvironmentError::Container { color, source })?;
        Ok(())
    }

    /// Best-effort stop used on abort paths; NotFound and not-running are
    /// fine there.
    pub async fn stop_if_present(&self, color: Color) {
        match self.resolve(color).await {
            Ok(id) => {
                if let Err(e) = self
                    .runtime
                    .signal_container(&id, &self.config.drain.stop_signal)
                    .await
                {
                    debug!(%color, error = %e, "best-effort stop failed");
                }
            }
            Err(e) => debug!(%color, error = %e, "best-effort stop found no container"),
        }
    }

    /// One liveness probe against the environment's address.
    async fn is_live(&self, color: Color) -> bool {
        http_probe(
            self.config.address(color),
            &self.config.health.path,
            self.config.health.timeout,
        )
        .await
            == ProbeResult::Healthy
    }

    async fn resolve(&self, color: Color) -> Result<ContainerId, EnvironmentError> {
        let name = self.config.container_name(color);
        self.runtime
            .find_container(&name)
            .await
            .map_err(|source| EnvironmentError::Container { color, source })?
            .map(|info| info.id)
            .ok_or(EnvironmentError::NotDeployed(color))
    }

    fn container_spec(&self, color: Color) -> ContainerSpec {
        let mut env = self.config.env.clone();
        // The service reports its own color on /healthz and /readyz.
        env.insert("APP_COLOR".to_string(), color.to_string());

        let mut labels = self.config.labels.clone();
        labels.insert("glaukos.managed".to_string(), "true".to_string());
        labels.insert("glaukos.service".to_string(), self.config.service.to_string());
        labels.insert("glaukos.color".to_string(), color.to_string());

        ContainerSpec {
            name: self.config.container_name(color),
            image: self.config.image.clone(),
            env,
            labels,
        }
    }
}
