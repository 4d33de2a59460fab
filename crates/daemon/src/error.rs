// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-level startup/lifecycle error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine a state directory (set CONTROLLER_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("no child command configured (set `command` in the config file or CONTROLLER_COMMAND)")]
    MissingCommand,

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse { path: std::path::PathBuf, #[source] source: toml::de::Error },

    #[error("another daemon instance is already running (lock held at {0})")]
    LockHeld(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule set error: {0}")]
    Rule(#[from] warden_rules::RuleError),

    #[error("event log error: {0}")]
    Storage(#[from] warden_storage::StorageError),
}
