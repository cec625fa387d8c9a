// ABOUTME: Drain configuration for retiring the previous environment.
// ABOUTME: Pre-shutdown hook, grace period, graceful-stop signal, exit deadline.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrainConfig {
    /// Best-effort hook invoked on the retiring environment before the
    /// grace period. Failure is logged, never fatal.
    #[serde(default = "default_pre_shutdown_path")]
    pub pre_shutdown_path: String,

    /// Time for in-flight requests to observe the hook before stop.
    #[serde(default = "default_grace_period", with = "humantime_serde")]
    pub grace_period: Duration,

    #[serde(default = "default_stop_signal")]
    pub stop_signal: String,

    /// Deadline for the old environment to exit after graceful stop.
    #[serde(default = "default_drain_timeout", with = "humantime_serde")]
    pub drain_timeout: Duration,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Per-request deadline for the pre-shutdown hook call.
    #[serde(default = "default_hook_timeout", with = "humantime_serde")]
    pub hook_timeout: Duration,
}

fn default_pre_shutdown_path() -> String {
    "/chat/pre-shutdown/".to_string()
}

fn default_grace_period() -> Duration {
    Duration::from_secs(10)
}

fn default_stop_signal() -> String {
    "SIGTERM".to_string()
}

fn default_drain_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_hook_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for DrainConfig {
    fn default() -> Self {
        DrainConfig {
            pre_shutdown_path: default_pre_shutdown_path(),
            grace_period: default_grace_period(),
            stop_signal: default_stop_signal(),
            drain_timeout: default_drain_timeout(),
            poll_interval: default_poll_interval(),
            hook_timeout: default_hook_timeout(),
        }
    }
}
