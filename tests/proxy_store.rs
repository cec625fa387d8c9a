// ABOUTME: Integration tests for the proxy config store.
// ABOUTME: Atomicity, ambiguity errors, and bounded backup retention.

mod support;

use glaukos::proxy::{MAX_BACKUPS, ProxyConfig, ProxyConfigStore, StoreError};
use glaukos::types::Color;
use tempfile::TempDir;

const BLUE: &str = "127.0.0.1:8001";
const GREEN: &str = "127.0.0.1:8002";

fn store_in(dir: &TempDir) -> ProxyConfigStore {
    ProxyConfigStore::new(
        dir.path().join("chat-upstream.conf"),
        dir.path().join("backups"),
        "chat_backend".to_string(),
        BLUE.to_string(),
        GREEN.to_string(),
    )
}

/// Seed the live config file directly, as initial provisioning would.
fn seed(dir: &TempDir, color: Color) {
    let address = match color {
        Color::Blue => BLUE,
        Color::Green => GREEN,
    };
    let rendered = ProxyConfig::render("chat_backend", address);
    std::fs::write(dir.path().join("chat-upstream.conf"), rendered.content()).unwrap();
}

#[tokio::test]
async fn write_then_read_round_trips_both_colors() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    for color in [Color::Green, Color::Blue, Color::Green] {
        store.write_active_color(color).await.unwrap();
        assert_eq!(store.read_active_color().await.unwrap(), color);
    }
}

#[tokio::test]
async fn read_is_idempotent_without_intervening_writes() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    seed(&dir, Color::Blue);

    let first = store.read_active_color().await.unwrap();
    let second = store.read_active_color().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, Color::Blue);
}

#[tokio::test]
async fn missing_declaration_fails_loudly() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        dir.path().join("chat-upstream.conf"),
        "upstream chat_backend {\n}\n",
    )
    .unwrap();

    let err = store.read_active_color().await.unwrap_err();
    assert!(matches!(err, StoreError::AmbiguousConfig { .. }));
}

#[tokio::test]
async fn unknown_address_fails_instead_of_defaulting() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        dir.path().join("chat-upstream.conf"),
        "upstream chat_backend {\n    server 10.9.9.9:1234;\n}\n",
    )
    .unwrap();

    let err = store.read_active_color().await.unwrap_err();
    assert!(matches!(err, StoreError::AmbiguousConfig { .. }));
    assert!(err.to_string().contains("matches neither environment"));
}

#[tokio::test]
async fn duplicate_declarations_fail() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        dir.path().join("chat-upstream.conf"),
        format!("upstream chat_backend {{\n    server {BLUE};\n    server {GREEN};\n}}\n"),
    )
    .unwrap();

    assert!(matches!(
        store.read_active_color().await.unwrap_err(),
        StoreError::AmbiguousConfig { .. }
    ));
}

#[tokio::test]
async fn writes_leave_no_temp_files_behind() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.write_active_color(Color::Blue).await.unwrap();
    store.write_active_color(Color::Green).await.unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(".tmp-"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

#[tokio::test]
async fn first_write_takes_no_backup_of_nothing() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.write_active_color(Color::Blue).await.unwrap();
    assert!(store.backups().await.unwrap().is_empty());
}

#[tokio::test]
async fn backups_are_capped_at_five_newest_first_out() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    seed(&dir, Color::Blue);

    // Eight writes: the first snapshots the seed, later ones each other.
    for i in 0..8 {
        let color = if i % 2 == 0 { Color::Green } else { Color::Blue };
        store.write_active_color(color).await.unwrap();
    }

    let backups = store.backups().await.unwrap();
    assert_eq!(backups.len(), MAX_BACKUPS);

    // Ordered oldest first by construction.
    let mut sorted = backups.clone();
    sorted.sort();
    assert_eq!(backups, sorted);
}

#[tokio::test]
async fn restore_latest_backup_reverts_the_last_write() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    seed(&dir, Color::Blue);

    // Snapshot of blue taken, then live config becomes green.
    store.write_active_color(Color::Green).await.unwrap();
    assert_eq!(store.read_active_color().await.unwrap(), Color::Green);

    store.restore_latest_backup().await.unwrap();
    assert_eq!(store.read_active_color().await.unwrap(), Color::Blue);
}

#[tokio::test]
async fn restore_without_backups_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(matches!(
        store.restore_latest_backup().await.unwrap_err(),
        StoreError::NoBackup
    ));
}

mod retention_property {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// After any sequence of writes: the live config reads back as the
        /// last written color, and the backup set never exceeds its cap.
        #[test]
        fn backup_set_stays_bounded(colors in prop::collection::vec(prop::bool::ANY, 1..12)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let dir = TempDir::new().unwrap();
                let store = store_in(&dir);

                let mut last = None;
                for blue in &colors {
                    let color = if *blue { Color::Blue } else { Color::Green };
                    store.write_active_color(color).await.unwrap();
                    last = Some(color);
                }

                prop_assert!(store.backups().await.unwrap().len() <= MAX_BACKUPS);
                prop_assert_eq!(store.read_active_color().await.unwrap(), last.unwrap());
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
