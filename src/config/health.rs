// ABOUTME: Health gate configuration for the standby liveness poll.
// ABOUTME: Bounded attempts at a fixed interval; first 2xx wins.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_path() -> String {
    "/healthz".to_string()
}

fn default_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_max_attempts() -> u32 {
    10
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for HealthConfig {
    fn default() -> Self {
        HealthConfig {
            path: default_path(),
            interval: default_interval(),
            max_attempts: default_max_attempts(),
            timeout: default_timeout(),
        }
    }
}
