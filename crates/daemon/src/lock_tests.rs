// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn acquire_writes_current_pid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.pid");
    let guard = acquire(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.trim(), std::process::id().to_string());
    drop(guard);
    assert!(!path.exists());
}

#[test]
#[cfg(target_os = "linux")]
fn acquire_rejects_a_pid_file_for_a_live_process() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.pid");
    std::fs::write(&path, std::process::id().to_string()).unwrap();
    let err = acquire(&path).unwrap_err();
    assert!(matches!(err, DaemonError::LockHeld(_)));
}

#[test]
fn acquire_reclaims_a_stale_pid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.pid");
    // PID 0 never belongs to a live, distinct process from our perspective.
    std::fs::write(&path, "999999999").unwrap();
    let guard = acquire(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.trim(), std::process::id().to_string());
    drop(guard);
}
