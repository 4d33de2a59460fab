// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types emitted by every component, and written to the Event Log.
//!
//! Serializes with `{"type": "task:started", ...fields}` shape, one variant
//! per state transition or stream signal named in spec §2/§4/§6.

use crate::detection::Detection;
use crate::phase::{PhaseName, PhaseOutcome, Violation};
use crate::task::{FailureReason, TaskId, TaskState};
use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope wrapping every event with the routing fields the Event Log and
/// the control plane key off: `timestamp`, `task_id`, `worker_id`, `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp_ms: u64,
    pub task_id: Option<TaskId>,
    pub worker_id: Option<WorkerId>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(timestamp_ms: u64, task_id: Option<TaskId>, worker_id: Option<WorkerId>, kind: EventKind) -> Self {
        Self {
            timestamp_ms,
            task_id,
            worker_id,
            kind,
        }
    }
}

/// The payload-carrying part of an event. Tagged by `type` so the control
/// plane and event log can filter without deserializing the whole payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    #[serde(rename = "task:submitted")]
    TaskSubmitted { prompt: String, priority: i64 },

    #[serde(rename = "task:update")]
    TaskUpdate {
        from: TaskState,
        to: TaskState,
        reason: Option<FailureReason>,
    },

    #[serde(rename = "stream:data")]
    Data { chunk: String },

    #[serde(rename = "stream:heartbeat")]
    Heartbeat,

    #[serde(rename = "stream:stall")]
    Stall { idle_ms: u64 },

    #[serde(rename = "tool_call")]
    ToolCall { payload: Value },

    #[serde(rename = "intervention")]
    Intervention {
        rule_id: Option<String>,
        text: String,
        escalated: bool,
    },

    #[serde(rename = "detection")]
    DetectionEvent { detection: Detection },

    #[serde(rename = "exit")]
    Exit {
        exit_code: Option<i32>,
        signal: Option<i32>,
    },

    #[serde(rename = "verification")]
    Verification { passed: bool, report: Value },

    #[serde(rename = "spawn_child")]
    SpawnChild { child_task_id: TaskId },

    #[serde(rename = "worker:replaced")]
    WorkerReplaced { dead_worker_id: WorkerId, new_worker_id: WorkerId },

    #[serde(rename = "phase:start")]
    PhaseStart { phase: PhaseName },

    #[serde(rename = "phase:violation")]
    PhaseViolation { phase: PhaseName, violation: Violation },

    #[serde(rename = "phase:result")]
    PhaseResult { phase: PhaseName, outcome: PhaseOutcome },

    #[serde(rename = "error")]
    Error { message: String },

    /// Unknown type tags deserialize here instead of failing, matching the
    /// Event Log's "never lose a line" contract for forward compatibility.
    #[serde(other)]
    Custom,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
