// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level error taxonomy (spec §7).

use thiserror::Error;
use warden_core::TaskId;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("prompt must not be empty")]
    InvalidInput,

    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("task {0} is not running")]
    NotRunning(TaskId),

    #[error("pty adapter error: {0}")]
    Pty(#[from] warden_adapters::PtyError),

    #[error("rule set error: {0}")]
    Rule(#[from] warden_rules::RuleError),

    #[error("storage error: {0}")]
    Storage(#[from] warden_storage::StorageError),

    #[error("controller is shutting down")]
    ShuttingDown,
}

#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("phase {phase} timed out after {duration_minutes} minutes")]
    Timeout { phase: String, duration_minutes: u64 },

    #[error("phase {phase} failed: {source}")]
    Supervisor {
        phase: String,
        #[source]
        source: SupervisorError,
    },

    #[error("required artifact not produced for phase {phase}: {pattern}")]
    MissingArtifact { phase: String, pattern: String },
}
