// ABOUTME: State transition methods for the promotion machine.
// ABOUTME: Pre-switch transitions can fail and hand self back; post-switch cannot fail.

use std::marker::PhantomData;
use std::time::Instant;

use tracing::info;

use crate::diagnostics::{Diagnostics, Warning};
use crate::drain::DrainController;
use crate::environment::EnvironmentController;
use crate::health::HealthGate;
use crate::proxy::{ProxyConfigStore, TrafficSwitcher};
use crate::runtime::{ContainerOps, ImageOps};
use crate::smoke::SmokeTester;
use crate::types::Color;

use super::error::PromoteError;
use super::report::{Phase, PromotionReport};
use super::state::{Done, Resolved, StandbyHealthy, StandbyStarted, Switched, Verified};

/// Result type for pre-switch transitions: failure returns the promotion
/// in its prior state together with the error, so the caller decides what
/// to do with the standby.
pub type TransitionResult<T, S> = Result<Promotion<T>, (Promotion<S>, PromoteError)>;

/// One promotion run, parameterized by its current state. Owns the
/// run-scoped deployment state; discarded at completion and never
/// persisted (the proxy config file is the only durable record).
#[derive(Debug)]
pub struct Promotion<S> {
    active: Color,
    standby: Color,
    diagnostics: Diagnostics,
    started_at: Instant,
    _state: PhantomData<S>,
}

impl<S> Promotion<S> {
    /// Color serving traffic when the run began.
    pub fn initial_active(&self) -> Color {
        self.active
    }

    /// The promotion target.
    pub fn standby(&self) -> Color {
        self.standby
    }

    fn transition<T>(self) -> Promotion<T> {
        Promotion {
            active: self.active,
            standby: self.standby,
            diagnostics: self.diagnostics,
            started_at: self.started_at,
            _state: PhantomData,
        }
    }
}

// =============================================================================
// Resolved (IDLE)
// =============================================================================

impl Promotion<Resolved> {
    /// Begin a run by reading the committed active color. An ambiguous or
    /// unreadable proxy config aborts here, before anything is touched.
    pub async fn begin(store: &ProxyConfigStore) -> Result<Self, PromoteError> {
        let active = store
            .read_active_color()
            .await
            .map_err(PromoteError::Resolve)?;
        let standby = active.opposite();
        info!(%active, %standby, "promotion starting");

        Ok(Promotion {
            active,
            standby,
            diagnostics: Diagnostics::default(),
            started_at: Instant::now(),
            _state: PhantomData,
        })
    }

    /// Bring up the standby. Build or start failure aborts before any
    /// traffic change.
    pub async fn start_standby<R>(
        self,
        environments: &EnvironmentController<'_, R>,
    ) -> TransitionResult<StandbyStarted, Resolved>
    where
        R: ContainerOps + ImageOps,
    {
        match environments.start(self.standby).await {
            Ok(outcome) => {
                info!(standby = %self.standby, ?outcome, "standby is up");
                Ok(self.transition())
            }
            Err(e) => Err((self, PromoteError::StandbyStart(e))),
        }
    }
}

// =============================================================================
// StandbyStarted (STANDBY_STARTING)
// =============================================================================

impl Promotion<StandbyStarted> {
    /// Gate on the standby's liveness endpoint.
    pub async fn await_standby_healthy(
        self,
        gate: &HealthGate,
        standby_address: &str,
    ) -> TransitionResult<StandbyHealthy, StandbyStarted> {
        match gate.await_healthy(self.standby, standby_address).await {
            Ok(_observation) => Ok(self.transition()),
            Err(e) => Err((self, e.into())),
        }
    }
}

// =============================================================================
// StandbyHealthy -> Switched: the commit point
// =============================================================================

impl Promotion<StandbyHealthy> {
    /// Commit the switch. On failure the switcher has already restored the
    /// previous config, so the old color still serves and the run aborts.
    pub async fn switch_traffic<R>(
        self,
        switcher: &TrafficSwitcher<'_, R>,
    ) -> TransitionResult<Switched, StandbyHealthy>
    where
        R: ContainerOps,
    {
        match switcher.switch_to(self.standby).await {
            Ok(()) => Ok(self.transition()),
            Err(e) => Err((self, e.into())),
        }
    }
}

// =============================================================================
// Switched and beyond: forward only, failures become warnings
// =============================================================================

impl Promotion<Switched> {
    /// Color now serving traffic.
    pub fn new_active(&self) -> Color {
        self.standby
    }

    /// Verify the newly active environment. Traffic has already switched,
    /// so probe and handshake failures are recorded as warnings rather
    /// than reverting anything.
    pub async fn verify(mut self, tester: &SmokeTester, address: &str) -> Promotion<Verified> {
        let report = tester.verify(self.standby, address).await;

        for failed in report.failed_probes() {
            self.diagnostics.warn(Warning::smoke_probe(format!(
                "post-switch probe {} on {} failed ({:?})",
                failed.path, report.color, failed.result
            )));
        }
        if let Err(e) = &report.handshake {
            self.diagnostics.warn(Warning::handshake(format!(
                "websocket handshake smoke test on {} failed: {e}",
                report.color
            )));
        }

        let phase = if report.is_clean() {
            Phase::Verified
        } else {
            Phase::VerifiedWithWarnings
        };
        info!(%phase, "verification phase complete");

        self.transition()
    }
}

impl Promotion<Verified> {
    /// Retire the environment that lost the active role. Also infallible;
    /// a drain timeout degrades to forced termination plus a warning.
    pub async fn retire_previous<R>(
        mut self,
        drainer: &DrainController<'_, R>,
    ) -> Promotion<Done>
    where
        R: ContainerOps + ImageOps,
    {
        let previous = self.active;
        info!(%previous, "draining previous environment");
        let outcome = drainer.retire(previous, &mut self.diagnostics).await;
        info!(%previous, ?outcome, "previous environment retired");
        self.transition()
    }
}

impl Promotion<Done> {
    /// Consume the run and produce its report.
    pub fn finish(self) -> PromotionReport {
        PromotionReport {
            initial_active: self.active,
            final_active: self.standby,
            phase: Phase::Done,
            warnings: self.diagnostics.into_warnings(),
            duration: self.started_at.elapsed(),
        }
    }
}
