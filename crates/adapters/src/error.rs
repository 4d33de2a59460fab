// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from PTY adapter operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PtyError {
    #[error("pty session already running")]
    AlreadyRunning,

    #[error("pty session not running")]
    NotRunning,

    #[error("failed to spawn child: {0}")]
    SpawnFailed(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("resize failed: {0}")]
    ResizeFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
