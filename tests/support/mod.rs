// ABOUTME: Test support utilities.
// ABOUTME: Fake container runtime and stub HTTP endpoints for promotion tests.

use std::sync::Once;

// Each test binary only uses some of these modules, so allow dead_code.
#[allow(dead_code)]
pub mod fake_runtime;
#[allow(dead_code)]
pub mod stub_http;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("glaukos=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A config with short timeouts, pointing the proxy paths into `dir` and
/// the environment addresses at the given endpoints.
#[allow(dead_code)]
pub fn test_config(
    dir: &std::path::Path,
    blue_address: &str,
    green_address: &str,
) -> glaukos::config::Config {
    use std::time::Duration;

    let mut config = glaukos::config::Config::template_with_paths(
        dir.join("chat-upstream.conf"),
        Some(dir.join("backups")),
    );
    config.environments.blue.address = blue_address.to_string();
    config.environments.green.address = green_address.to_string();

    config.health.interval = Duration::from_millis(20);
    config.health.max_attempts = 5;
    config.health.timeout = Duration::from_millis(300);

    config.smoke.timeout = Duration::from_millis(500);
    config.smoke.handshake_attempts = 2;
    config.smoke.handshake_backoff = Duration::from_millis(10);

    config.drain.grace_period = Duration::from_millis(10);
    config.drain.drain_timeout = Duration::from_millis(300);
    config.drain.poll_interval = Duration::from_millis(10);
    config.drain.hook_timeout = Duration::from_millis(300);

    config
}
