//! # Model Lock
//!
//! A host application instance is single-threaded state: two sessions driving
//! the same model file would interleave their edits. A session therefore holds
//! an advisory lock on its model file while it is open.
//!
//! The lock is both an OS-level lock (via fs2) on a `.lock` sidecar file and
//! JSON metadata inside that file so other users can see who holds it. Locks
//! left behind by a dead process, or older than 24 hours, are taken over.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{BotError, BotResult};

/// Lock file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who opened the session
    pub owner: String,
    /// Machine name where the lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(owner: impl Into<String>) -> Self {
        LockInfo {
            owner: owner.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Best guess at the current user, for lock metadata
pub fn current_user() -> String {
    std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Guard that releases the lock when dropped
#[derive(Debug)]
pub struct ModelLock {
    model_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl ModelLock {
    /// Acquire an exclusive lock on `path`.
    ///
    /// Fails with `BotError::FileLocked` when a live session holds it.
    pub fn acquire(path: &Path, owner: impl Into<String>) -> BotResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(owner);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !is_lock_stale(&existing) {
                return Err(BotError::file_locked(
                    path.display().to_string(),
                    format!("{} ({}, pid {})", existing.owner, existing.machine, existing.pid),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            info!(path = %path.display(), owner = %existing.owner, "taking over stale model lock");
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| BotError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            BotError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        // Only the holder of the OS lock may replace the metadata
        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .set_len(0)
            .and_then(|_| lock_file.write_all(lock_json.as_bytes()))
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| BotError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        debug!(path = %path.display(), "model lock acquired");
        Ok(ModelLock {
            model_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current holder of the lock on `path`, if any
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !is_lock_stale(info))
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Drop for ModelLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `model.edb` → `model.edb.lock`
fn lock_path_for(model_path: &Path) -> PathBuf {
    let mut lock_path = model_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine && !process_alive(info.pid) {
            return true;
        }
    }

    let age = Utc::now() - info.locked_at;
    age.num_hours() > 24
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()),
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}
