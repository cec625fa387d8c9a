// ABOUTME: Reverse-proxy config ownership and the traffic switch commit point.
// ABOUTME: Store handles atomic file mutation; switcher pairs it with the reload.

mod store;
mod switcher;

pub use store::{MAX_BACKUPS, ProxyConfig, ProxyConfigStore, StoreError};
pub use switcher::{SwitchError, TrafficSwitcher};
