// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identifier and pool-membership state.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a worker instance.
    pub struct WorkerId;
}

/// State of a worker within the Supervisor's pool (spec §3 invariants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Idle,
    Busy,
    Dead,
}
