// ABOUTME: Reverse-proxy settings: the managed upstream file and reload target.
// ABOUTME: The upstream file is the single source of truth for the active color.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxySettings {
    /// The upstream include file owned and rewritten by glaukos.
    pub upstream_file: PathBuf,

    /// Container running the reverse proxy; reloaded by signal, never
    /// restarted, so in-flight connections survive the switch.
    pub container: String,

    /// Snapshot directory; defaults to `backups/` next to the upstream file.
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,

    /// Upstream block name; defaults to `<service>_backend`.
    #[serde(default)]
    pub upstream_name: Option<String>,

    #[serde(default = "default_reload_signal")]
    pub reload_signal: String,
}

fn default_reload_signal() -> String {
    "SIGHUP".to_string()
}

impl ProxySettings {
    pub fn backup_dir(&self) -> PathBuf {
        match &self.backup_dir {
            Some(dir) => dir.clone(),
            None => self
                .upstream_file
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("backups"),
        }
    }

    pub fn upstream_name(&self, service: &crate::types::ServiceName) -> String {
        match &self.upstream_name {
            Some(name) => name.clone(),
            None => format!("{}_backend", service.as_str().replace('-', "_")),
        }
    }
}
