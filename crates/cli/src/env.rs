// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket-path resolution for the CLI client, matching `wardend`'s own
//! precedence (spec §6): `CONTROLLER_SOCKET_PATH` > `$XDG_RUNTIME_DIR` >
//! `<state dir>/controller.sock`. Duplicated rather than shared with
//! `warden_daemon::config::Config` because the CLI never needs the rest of
//! the daemon's configuration — only where to find the socket.

use crate::error::ClientError;
use std::path::PathBuf;

fn state_dir() -> Result<PathBuf, ClientError> {
    if let Ok(dir) = std::env::var("CONTROLLER_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("controller"));
    }
    let home = std::env::var("HOME").map_err(|_| ClientError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/controller"))
}

pub fn socket_path() -> Result<PathBuf, ClientError> {
    if let Ok(path) = std::env::var("CONTROLLER_SOCKET_PATH") {
        return Ok(PathBuf::from(path));
    }
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return Ok(PathBuf::from(runtime_dir).join("controller.sock"));
    }
    Ok(state_dir()?.join("controller.sock"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
