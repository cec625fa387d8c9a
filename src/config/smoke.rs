// ABOUTME: Smoke test configuration for post-switch verification.
// ABOUTME: Covers the endpoint probes and the WebSocket handshake retries.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmokeConfig {
    /// Per-probe response deadline for /healthz, /readyz, and /metrics.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_handshake_path")]
    pub handshake_path: String,

    #[serde(default = "default_handshake_attempts")]
    pub handshake_attempts: u32,

    #[serde(default = "default_handshake_backoff", with = "humantime_serde")]
    pub handshake_backoff: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_handshake_path() -> String {
    "/ws/chat/".to_string()
}

fn default_handshake_attempts() -> u32 {
    3
}

fn default_handshake_backoff() -> Duration {
    Duration::from_secs(2)
}

impl Default for SmokeConfig {
    fn default() -> Self {
        SmokeConfig {
            timeout: default_timeout(),
            handshake_path: default_handshake_path(),
            handshake_attempts: default_handshake_attempts(),
            handshake_backoff: default_handshake_backoff(),
        }
    }
}
