// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detection records emitted by the Stream Pipeline's rule matcher.

use crate::rule::{RuleId, Severity};
use crate::task::TaskId;
use serde::{Deserialize, Serialize};

/// One rule match against a tail-window snapshot of a task's output.
/// Never mutated after creation (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub rule_id: RuleId,
    pub severity: Severity,
    pub matched_text: String,
    pub timestamp_ms: u64,
    pub task_id: TaskId,
    /// The tail-window contents at match time, for post-hoc debugging.
    pub window_snapshot: String,
}
