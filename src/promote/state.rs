// ABOUTME: Promotion state marker types for the type state pattern.
// ABOUTME: Zero-sized types make invalid transition order unrepresentable.

/// Colors resolved from the proxy config; nothing touched yet.
/// Available actions: `start_standby()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolved;

/// Standby container is up but not yet known to be healthy.
/// Available actions: `await_standby_healthy()`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandbyStarted;

/// Standby answered its liveness probe; ready to take traffic.
/// Available actions: `switch_traffic()`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandbyHealthy;

/// Traffic committed to the new color. From here the machine only moves
/// forward; there is no transition back.
/// Available actions: `verify()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Switched;

/// Smoke verification finished (possibly with warnings).
/// Available actions: `retire_previous()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Verified;

/// Old environment retired; terminal.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Done;
