// ABOUTME: Post-switch verification: endpoint probes plus a WebSocket handshake.
// ABOUTME: Runs after commit, so failures become warnings, never a revert.

mod handshake;

pub use handshake::{HandshakeError, ws_handshake};

use futures::join;
use tracing::info;

use crate::config::SmokeConfig;
use crate::health::{ProbeResult, http_probe};
use crate::retry::{RetryPolicy, retry};
use crate::types::Color;

/// Endpoints checked after every switch.
pub const PROBE_PATHS: [&str; 3] = ["/healthz", "/readyz", "/metrics"];

/// Outcome of one endpoint probe.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub path: &'static str,
    pub result: ProbeResult,
}

impl ProbeOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_healthy()
    }
}

/// Everything `verify` observed about the newly active environment.
#[derive(Debug)]
pub struct SmokeReport {
    pub color: Color,
    pub probes: Vec<ProbeOutcome>,
    pub handshake: Result<(), HandshakeError>,
}

impl SmokeReport {
    pub fn all_probes_passed(&self) -> bool {
        self.probes.iter().all(ProbeOutcome::passed)
    }

    pub fn failed_probes(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.probes.iter().filter(|p| !p.passed())
    }

    pub fn is_clean(&self) -> bool {
        self.all_probes_passed() && self.handshake.is_ok()
    }
}

/// Verifies a freshly promoted environment under real traffic conditions.
pub struct SmokeTester {
    config: SmokeConfig,
}

impl SmokeTester {
    pub fn new(config: SmokeConfig) -> Self {
        Self { config }
    }

    /// Probe the health, readiness, and metrics endpoints concurrently
    /// (read-only, so they can fan out), then attempt the WebSocket
    /// handshake with bounded retries. All results are collected into the
    /// report; nothing here aborts the promotion.
    pub async fn verify(&self, color: Color, address: &str) -> SmokeReport {
        let timeout = self.config.timeout;

        let (healthz, readyz, metrics) = join!(
            http_probe(address, PROBE_PATHS[0], timeout),
            http_probe(address, PROBE_PATHS[1], timeout),
            http_probe(address, PROBE_PATHS[2], timeout),
        );

        let probes = vec![
            ProbeOutcome {
                path: PROBE_PATHS[0],
                result: healthz,
            },
            ProbeOutcome {
                path: PROBE_PATHS[1],
                result: readyz,
            },
            ProbeOutcome {
                path: PROBE_PATHS[2],
                result: metrics,
            },
        ];

        let handshake = self.handshake_with_retries(address).await;

        let report = SmokeReport {
            color,
            probes,
            handshake,
        };
        info!(
            %color,
            probes_ok = report.all_probes_passed(),
            handshake_ok = report.handshake.is_ok(),
            "smoke verification finished"
        );
        report
    }

    async fn handshake_with_retries(&self, address: &str) -> Result<(), HandshakeError> {
        let policy = RetryPolicy::new(self.config.handshake_attempts, self.config.handshake_backoff);
        let path = self.config.handshake_path.as_str();
        let timeout = self.config.timeout;

        retry(policy, |_| ws_handshake(address, path, timeout))
            .await
            .map_err(|exhausted| exhausted.last_error)
    }
}
