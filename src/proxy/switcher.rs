// ABOUTME: Commits a promotion: rewrite the upstream file, then reload the proxy.
// ABOUTME: A failed reload restores the previous config before reporting failure.

use thiserror::Error;
use tracing::{error, info};

use crate::runtime::ContainerOps;
use crate::types::{Color, ContainerId};

use super::store::{ProxyConfigStore, StoreError};

#[derive(Debug, Error)]
pub enum SwitchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(
        "proxy reload failed after config write: {reason} \
         (previous config restored: {restored}; traffic still served by the old color)"
    )]
    ReloadFailed { reason: String, restored: bool },
}

/// Flips the routed color. The write-then-reload pair here is the single
/// commit point of a promotion: before success the old color serves, after
/// success the new color serves and the switch is never auto-reversed.
pub struct TrafficSwitcher<'a, R> {
    store: &'a ProxyConfigStore,
    runtime: &'a R,
    proxy_container: String,
    reload_signal: String,
}

impl<'a, R: ContainerOps> TrafficSwitcher<'a, R> {
    pub fn new(
        store: &'a ProxyConfigStore,
        runtime: &'a R,
        proxy_container: String,
        reload_signal: String,
    ) -> Self {
        Self {
            store,
            runtime,
            proxy_container,
            reload_signal,
        }
    }

    /// Rewrite the upstream file for `color` and signal the proxy to
    /// reload. Reload by signal keeps in-flight connections alive; a
    /// restart would drop them.
    pub async fn switch_to(&self, color: Color) -> Result<(), SwitchError> {
        self.store.write_active_color(color).await?;

        let proxy_id = ContainerId::new(self.proxy_container.clone());
        if let Err(e) = self
            .runtime
            .signal_container(&proxy_id, &self.reload_signal)
            .await
        {
            error!(container = %self.proxy_container, error = %e, "proxy reload failed");

            let restored = match self.store.restore_latest_backup().await {
                Ok(()) => true,
                Err(restore_err) => {
                    error!(error = %restore_err, "restore after failed reload also failed");
                    false
                }
            };

            return Err(SwitchError::ReloadFailed {
                reason: e.to_string(),
                restored,
            });
        }

        info!(%color, container = %self.proxy_container, "traffic switched");
        Ok(())
    }
}
