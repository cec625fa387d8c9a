// ABOUTME: Retires the previous environment: hook, grace period, stop, wait, kill.
// ABOUTME: Runs entirely after commit, so every failure degrades to a warning.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::diagnostics::{Diagnostics, Warning};
use crate::environment::{EnvironmentController, ExitWait};
use crate::runtime::{ContainerOps, ImageOps};
use crate::types::Color;

/// How the old environment went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Exited on its own within the drain timeout.
    GracefulExit,
    /// Still running at the deadline; SIGKILL was delivered.
    ForcedTermination,
    /// No running container was found to retire.
    AlreadyStopped,
}

/// Drains and stops the environment that just lost the active role.
pub struct DrainController<'a, R> {
    config: &'a Config,
    environments: &'a EnvironmentController<'a, R>,
}

impl<'a, R> DrainController<'a, R>
where
    R: ContainerOps + ImageOps,
{
    pub fn new(config: &'a Config, environments: &'a EnvironmentController<'a, R>) -> Self {
        Self {
            config,
            environments,
        }
    }

    /// Retire `color`: invoke the pre-shutdown hook (best effort), wait
    /// the grace period so in-flight requests observe it, request a
    /// graceful stop, poll for exit, and force-kill past the deadline.
    /// Never fails; problems land in `diagnostics`.
    pub async fn retire(&self, color: Color, diagnostics: &mut Diagnostics) -> DrainOutcome {
        let drain = &self.config.drain;

        // (a) Hook first, so connected clients hear a goodbye before the
        // process sees any signal. The result is always traced.
        match self.invoke_pre_shutdown_hook(color).await {
            Ok(()) => debug!(%color, "pre-shutdown hook accepted"),
            Err(reason) => diagnostics.warn(Warning::pre_shutdown_hook(format!(
                "pre-shutdown hook on {color} failed: {reason}"
            ))),
        }

        // (b) Grace period.
        if !drain.grace_period.is_zero() {
            debug!(%color, grace = ?drain.grace_period, "waiting out drain grace period");
            tokio::time::sleep(drain.grace_period).await;
        }

        // (c) Graceful stop.
        if let Err(e) = self.environments.request_stop(color).await {
            // Nothing left to stop means the drain is already done.
            debug!(%color, error = %e, "graceful stop request failed");
            return DrainOutcome::AlreadyStopped;
        }

        // (d) Bounded wait for exit.
        let waited = self
            .environments
            .wait_for_exit(color, drain.drain_timeout, drain.poll_interval)
            .await;

        match waited {
            Ok(ExitWait::Exited) => {
                info!(%color, "environment exited gracefully");
                DrainOutcome::GracefulExit
            }
            Ok(ExitWait::TimedOut) => {
                // (e) Past the deadline: force-terminate.
                diagnostics.warn(Warning::forced_termination(format!(
                    "{color} did not exit within {:?}; forcing termination",
                    drain.drain_timeout
                )));
                if let Err(e) = self.environments.force_kill(color).await {
                    warn!(%color, error = %e, "force kill failed");
                }
                DrainOutcome::ForcedTermination
            }
            Err(e) => {
                debug!(%color, error = %e, "exit wait could not inspect container");
                DrainOutcome::AlreadyStopped
            }
        }
    }

    /// POST to the pre-shutdown endpoint on the retiring environment.
    async fn invoke_pre_shutdown_hook(&self, color: Color) -> Result<(), String> {
        let address = self.config.address(color);
        let path = self.config.drain.pre_shutdown_path.as_str();

        post_hook(address, path, self.config.drain.hook_timeout).await
    }
}

/// One POST with a deadline; 2xx means the hook was observed.
async fn post_hook(address: &str, path: &str, timeout: Duration) -> Result<(), String> {
    let attempt = async {
        let stream = tokio::net::TcpStream::connect(address)
            .await
            .map_err(|e| format!("connect failed: {e}"))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| format!("http handshake failed: {e}"))?;

        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = hyper::Request::builder()
            .method("POST")
            .uri(path)
            .header("host", address)
            .header("content-length", "0")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .map_err(|e| format!("request build failed: {e}"))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(format!("endpoint answered {}", resp.status()))
        }
    };

    match tokio::time::timeout(timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err("hook timed out".to_string()),
    }
}
