// ABOUTME: Single-writer store for the reverse-proxy upstream file.
// ABOUTME: Atomic rewrites, timestamped backups capped at five, no silent defaults.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::types::Color;

/// Number of config snapshots retained; the oldest is evicted first.
pub const MAX_BACKUPS: usize = 5;

const BACKUP_PREFIX: &str = "upstream-";
const BACKUP_SUFFIX: &str = ".conf";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(
        "cannot determine active color from {path}: {reason}; refusing to guess \
         (restore a backup or rewrite the file by hand)"
    )]
    AmbiguousConfig { path: PathBuf, reason: String },

    #[error("failed to write proxy config {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read proxy config {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to snapshot proxy config: {0}")]
    BackupFailed(std::io::Error),

    #[error("no backup available to restore")]
    NoBackup,
}

/// The rendered upstream include file as a value.
///
/// Rendering and parsing live here so every writer produces, and every
/// reader expects, exactly one `server` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    content: String,
}

impl ProxyConfig {
    pub fn from_content(content: String) -> Self {
        Self { content }
    }

    /// Render a config routing all traffic for `upstream_name` to `address`.
    pub fn render(upstream_name: &str, address: &str) -> Self {
        let content = format!(
            "# Managed by glaukos. Edits are overwritten on every promotion.\n\
             upstream {upstream_name} {{\n\
             \x20   server {address};\n\
             }}\n"
        );
        Self { content }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Extract the single active-target address. Errors describe exactly
    /// which invariant broke: no declaration, several, or a malformed one.
    pub fn active_address(&self) -> Result<&str, String> {
        let mut found: Option<&str> = None;

        for line in self.content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some(rest) = line.strip_prefix("server ") else {
                continue;
            };
            let Some(address) = rest.trim().strip_suffix(';').map(str::trim) else {
                return Err(format!("malformed server declaration: '{line}'"));
            };
            if address.is_empty() {
                return Err(format!("malformed server declaration: '{line}'"));
            }
            if found.is_some() {
                return Err("multiple server declarations present".to_string());
            }
            found = Some(address);
        }

        found.ok_or_else(|| "no server declaration present".to_string())
    }
}

/// Owns the upstream file and its backup set. The only writer of the
/// proxy config; callers serialize access through the promotion lock.
pub struct ProxyConfigStore {
    path: PathBuf,
    backup_dir: PathBuf,
    upstream_name: String,
    blue_address: String,
    green_address: String,
}

impl ProxyConfigStore {
    pub fn new(
        path: PathBuf,
        backup_dir: PathBuf,
        upstream_name: String,
        blue_address: String,
        green_address: String,
    ) -> Self {
        Self {
            path,
            backup_dir,
            upstream_name,
            blue_address,
            green_address,
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            config.proxy.upstream_file.clone(),
            config.proxy.backup_dir(),
            config.upstream_name(),
            config.address(Color::Blue).to_string(),
            config.address(Color::Green).to_string(),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the live config; map its active address back to a
    /// color. Missing, malformed, duplicated, or unknown declarations are
    /// a hard error, never a default.
    pub async fn read_active_color(&self) -> Result<Color, StoreError> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| StoreError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })?;

        let config = ProxyConfig::from_content(content);
        let address = config
            .active_address()
            .map_err(|reason| StoreError::AmbiguousConfig {
                path: self.path.clone(),
                reason,
            })?;

        if address == self.blue_address {
            Ok(Color::Blue)
        } else if address == self.green_address {
            Ok(Color::Green)
        } else {
            Err(StoreError::AmbiguousConfig {
                path: self.path.clone(),
                reason: format!("active address {address} matches neither environment"),
            })
        }
    }

    /// Rewrite the config to route to `color`. Snapshots the current file
    /// first, writes to a temp file in the same directory, renames it over
    /// the live file, then trims the backup set. Readers never observe a
    /// partial write.
    pub async fn write_active_color(&self, color: Color) -> Result<(), StoreError> {
        self.backup_current().await?;

        let address = match color {
            Color::Blue => &self.blue_address,
            Color::Green => &self.green_address,
        };
        let rendered = ProxyConfig::render(&self.upstream_name, address);

        self.write_atomic(rendered.content()).await?;
        debug!(%color, %address, path = %self.path.display(), "proxy config updated");

        self.trim_backups().await;
        Ok(())
    }

    /// Copy the newest snapshot back over the live file. Used when the
    /// proxy refuses to reload the freshly written config.
    pub async fn restore_latest_backup(&self) -> Result<(), StoreError> {
        let latest = self
            .backups()
            .await
            .map_err(StoreError::BackupFailed)?
            .pop()
            .ok_or(StoreError::NoBackup)?;

        let content = tokio::fs::read_to_string(&latest)
            .await
            .map_err(|source| StoreError::ReadFailed {
                path: latest.clone(),
                source,
            })?;

        self.write_atomic(&content).await?;
        warn!(backup = %latest.display(), "proxy config restored from backup");
        Ok(())
    }

    /// Snapshot paths ordered oldest first. Ordering is lexicographic on
    /// the fixed-width timestamp names, which matches creation order.
    pub async fn backups(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.backup_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX) {
                backups.push(entry.path());
            }
        }
        backups.sort();
        Ok(backups)
    }

    async fn backup_current(&self) -> Result<(), StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            // Nothing to snapshot on the very first write.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(StoreError::ReadFailed {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(StoreError::BackupFailed)?;

        // Nanosecond resolution so rapid successive promotions cannot collide.
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.9f");
        let backup_path = self
            .backup_dir
            .join(format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}"));

        tokio::fs::write(&backup_path, content)
            .await
            .map_err(StoreError::BackupFailed)?;
        debug!(backup = %backup_path.display(), "proxy config snapshot taken");
        Ok(())
    }

    async fn write_atomic(&self, content: &str) -> Result<(), StoreError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;

        // Same directory as the target so the rename cannot cross filesystems.
        let tmp = parent.join(format!(
            ".{}.tmp-{}",
            self.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upstream".to_string()),
            std::process::id()
        ));

        let write_result = async {
            tokio::fs::write(&tmp, content).await?;
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        if let Err(source) = write_result {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::WriteFailed {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }

    async fn trim_backups(&self) {
        let backups = match self.backups().await {
            Ok(backups) => backups,
            Err(e) => {
                warn!(error = %e, "could not list backups for trimming");
                return;
            }
        };

        if backups.len() <= MAX_BACKUPS {
            return;
        }
        for stale in &backups[..backups.len() - MAX_BACKUPS] {
            if let Err(e) = tokio::fs::remove_file(stale).await {
                warn!(backup = %stale.display(), error = %e, "failed to evict old backup");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_config_parses_back() {
        let config = ProxyConfig::render("chat_backend", "127.0.0.1:8001");
        assert_eq!(config.active_address().unwrap(), "127.0.0.1:8001");
    }

    #[test]
    fn missing_declaration_is_ambiguous() {
        let config = ProxyConfig::from_content("# empty\nupstream chat {\n}\n".to_string());
        assert!(config.active_address().is_err());
    }

    #[test]
    fn duplicate_declarations_are_ambiguous() {
        let config = ProxyConfig::from_content(
            "upstream chat {\n    server 127.0.0.1:8001;\n    server 127.0.0.1:8002;\n}\n"
                .to_string(),
        );
        assert_eq!(
            config.active_address().unwrap_err(),
            "multiple server declarations present"
        );
    }

    #[test]
    fn unterminated_declaration_is_malformed() {
        let config =
            ProxyConfig::from_content("upstream chat {\n    server 127.0.0.1:8001\n}\n".to_string());
        assert!(config.active_address().unwrap_err().contains("malformed"));
    }

    #[test]
    fn commented_declarations_are_ignored() {
        let config = ProxyConfig::from_content(
            "# server 127.0.0.1:9999;\nupstream chat {\n    server 127.0.0.1:8001;\n}\n"
                .to_string(),
        );
        assert_eq!(config.active_address().unwrap(), "127.0.0.1:8001");
    }
}
