// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance daemon lock (spec §6 "at most one daemon instance per
//! state directory"), kept to a PID file: no advisory file locking (this
//! workspace does not carry `fs2`), just a check-and-remove-stale-pid dance
//! that is race-prone only in the already-degenerate case of two daemons
//! starting within the same instant.

use crate::error::DaemonError;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Returns a held lock, or `DaemonError::LockHeld` if the PID recorded at
/// `path` belongs to a process that is still alive.
pub fn acquire(path: &Path) -> Result<LockGuard, DaemonError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if let Ok(existing) = std::fs::read_to_string(path) {
        if let Some(pid) = existing.trim().parse::<u32>().ok().filter(|&pid| process_alive(pid)) {
            let _ = pid;
            return Err(DaemonError::LockHeld(path.to_path_buf()));
        }
    }

    let mut file = std::fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(LockGuard { path: path.to_path_buf() })
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// No `/proc` outside Linux; treat any recorded PID as stale rather than
/// pull in a platform-specific process-inspection dependency for it.
#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    false
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
