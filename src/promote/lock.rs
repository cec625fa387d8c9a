// ABOUTME: Single-flight promotion lock over the proxy config store.
// ABOUTME: Atomic create-new lock file with holder info; stale locks auto-break.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ServiceName;

use super::PromoteError;

/// Information about who holds the promotion lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub acquired_at: DateTime<Utc>,
    /// Service being promoted.
    pub service: String,
}

impl LockInfo {
    pub fn new(service: &ServiceName) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            acquired_at: Utc::now(),
            service: service.to_string(),
        }
    }

    /// A lock older than an hour belongs to a promotion that died.
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.acquired_at;
        age.num_hours() >= 1
    }
}

/// A held promotion lock. Guards the proxy config store: only one
/// promotion may run against it at a time.
#[derive(Debug)]
pub struct PromoteLock {
    path: PathBuf,
}

impl PromoteLock {
    /// Acquire the lock at `path` via atomic create-new (the file either
    /// did not exist and is now ours, or the acquisition fails). Breaks
    /// stale or corrupted locks, and any lock when `force` is set.
    pub fn acquire(path: &Path, service: &ServiceName, force: bool) -> Result<Self, PromoteError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PromoteError::Lock(format!("cannot create lock directory: {e}")))?;
        }

        match Self::try_create(path, service) {
            Ok(()) => return Ok(Self {
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() != std::io::ErrorKind::AlreadyExists => {
                return Err(PromoteError::Lock(format!("cannot create lock file: {e}")));
            }
            Err(_) => {}
        }

        // Lock exists: decide whether it may be broken.
        match Self::read_existing(path) {
            Some(existing) if !force && !existing.is_stale() => {
                return Err(PromoteError::LockHeld {
                    holder: existing.holder,
                    pid: existing.pid,
                    since: existing.acquired_at,
                });
            }
            Some(existing) => {
                tracing::warn!(
                    holder = %existing.holder,
                    pid = existing.pid,
                    since = %existing.acquired_at,
                    forced = force,
                    "breaking existing promotion lock"
                );
            }
            None => {
                tracing::warn!(path = %path.display(), "lock info unreadable, breaking lock");
            }
        }

        std::fs::remove_file(path)
            .map_err(|e| PromoteError::Lock(format!("cannot break lock: {e}")))?;

        // One retry; losing the race again means a live competitor.
        Self::try_create(path, service).map_err(|_| {
            PromoteError::Lock("lock acquired by another process during break".to_string())
        })?;

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn try_create(path: &Path, service: &ServiceName) -> std::io::Result<()> {
        let info = LockInfo::new(service);
        let json = serde_json::to_string(&info).map_err(std::io::Error::other)?;

        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    fn read_existing(path: &Path) -> Option<LockInfo> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Release the lock.
    pub fn release(self) -> Result<(), std::io::Error> {
        std::fs::remove_file(&self.path)
    }
}
