// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI client error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (no socket at {0})")]
    DaemonNotRunning(std::path::PathBuf),

    #[error("protocol error: {0}")]
    Protocol(#[from] warden_daemon::protocol::ProtocolError),

    #[error("daemon rejected the request: {0}")]
    Rejected(String),

    #[error("unexpected response from daemon")]
    UnexpectedResponse,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine a state directory (set CONTROLLER_STATE_DIR or HOME)")]
    NoStateDir,
}
