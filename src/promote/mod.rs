// ABOUTME: Promotion orchestration: lock, resolve, gate, switch, verify, drain.
// ABOUTME: Composes the controllers into one single-flight state machine run.

mod error;
mod lock;
mod report;
mod state;
mod transitions;

pub use error::PromoteError;
pub use lock::{LockInfo, PromoteLock};
pub use report::{Phase, PromotionReport};
pub use state::{Done, Resolved, StandbyHealthy, StandbyStarted, Switched, Verified};
pub use transitions::{Promotion, TransitionResult};

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::Config;
use crate::diagnostics::Warning;
use crate::drain::DrainController;
use crate::environment::EnvironmentController;
use crate::health::HealthGate;
use crate::proxy::{ProxyConfigStore, TrafficSwitcher};
use crate::runtime::{ContainerOps, ImageOps};
use crate::smoke::SmokeTester;
use crate::types::Color;

/// Per-run options from the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromoteOptions {
    /// Break an existing promotion lock.
    pub force: bool,
    /// On a pre-switch abort, leave the standby running for inspection
    /// instead of stopping it.
    pub keep_standby: bool,
}

/// Lock file guarding the proxy config store, next to the upstream file.
pub fn lock_path(config: &Config) -> PathBuf {
    config.proxy.upstream_file.with_extension("lock")
}

/// Run one full promotion. Exactly one of these may execute against a
/// given proxy config store at a time; the file lock enforces that across
/// processes.
pub async fn run_promotion<R>(
    config: &Config,
    runtime: &R,
    options: PromoteOptions,
) -> Result<PromotionReport, PromoteError>
where
    R: ContainerOps + ImageOps,
{
    let lock = PromoteLock::acquire(&lock_path(config), &config.service, options.force)?;

    let store = ProxyConfigStore::from_config(config);
    let result = drive(config, runtime, &store, options).await;

    let release_result = lock.release();

    let mut report = result?;
    if let Err(e) = release_result {
        warn!(error = %e, "failed to release promotion lock");
        report.warnings.push(Warning::lock_release(format!(
            "failed to release promotion lock: {e}"
        )));
    }
    Ok(report)
}

async fn drive<R>(
    config: &Config,
    runtime: &R,
    store: &ProxyConfigStore,
    options: PromoteOptions,
) -> Result<PromotionReport, PromoteError>
where
    R: ContainerOps + ImageOps,
{
    let environments = EnvironmentController::new(config, runtime);
    let gate = HealthGate::new(config.health.clone());
    let switcher = TrafficSwitcher::new(
        store,
        runtime,
        config.proxy.container.clone(),
        config.proxy.reload_signal.clone(),
    );
    let tester = SmokeTester::new(config.smoke.clone());
    let drainer = DrainController::new(config, &environments);

    let promotion = Promotion::begin(store).await?;
    let standby = promotion.standby();

    // Everything before the switch races against Ctrl-C: an interrupt
    // here aborts cleanly with the original active color untouched. After
    // the switch the signal is no longer raced; a committed promotion is
    // never auto-reversed.
    let pre_switch = async {
        let started = match promotion.start_standby(&environments).await {
            Ok(p) => p,
            Err((_, e)) => return Err(e),
        };
        match started
            .await_standby_healthy(&gate, config.address(standby))
            .await
        {
            Ok(p) => Ok(p),
            Err((_, e)) => Err(e),
        }
    };

    let healthy = tokio::select! {
        biased;
        _ = tokio::signal::ctrl_c() => Err(PromoteError::Interrupted),
        result = pre_switch => result,
    };

    let healthy = match healthy {
        Ok(p) => p,
        Err(e) => {
            abort_standby(&environments, standby, options).await;
            return Err(e);
        }
    };

    let switched = match healthy.switch_traffic(&switcher).await {
        Ok(p) => p,
        Err((_, e)) => {
            abort_standby(&environments, standby, options).await;
            return Err(e);
        }
    };
    info!(new_active = %switched.new_active(), "switch committed");

    let verified = switched.verify(&tester, config.address(standby)).await;
    let done = verified.retire_previous(&drainer).await;

    Ok(done.finish())
}

/// Abort disposition of the standby: stopped by default, left running for
/// inspection with `--keep-standby`.
async fn abort_standby<R>(
    environments: &EnvironmentController<'_, R>,
    standby: Color,
    options: PromoteOptions,
) where
    R: ContainerOps + ImageOps,
{
    if options.keep_standby {
        info!(%standby, "aborted; leaving standby running for inspection");
    } else {
        info!(%standby, "aborted; stopping standby");
        environments.stop_if_present(standby).await;
    }
}
