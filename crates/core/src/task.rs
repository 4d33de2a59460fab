// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identifier, state machine, and acceptance criteria.

use crate::phase::PhaseName;
use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a task instance.
    #[derive(Default)]
    pub struct TaskId;
}

/// Lifecycle state of a task. See spec §4.1 for the allowed edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Queued,
    Assigned,
    Running,
    Verifying,
    Complete,
    Failed,
}

impl TaskState {
    /// Whether this state is terminal (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Complete | TaskState::Failed)
    }

    /// Whether `self -> next` is an allowed edge of the state machine.
    ///
    /// `running -> queued` (worker-death requeue) and `* -> failed` (explicit
    /// kill) are the only edges that do not simply advance the pipeline.
    pub fn can_transition_to(self, next: TaskState) -> bool {
        use TaskState::*;
        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }
        matches!(
            (self, next),
            (Queued, Assigned)
                | (Assigned, Running)
                | (Assigned, Queued)
                | (Running, Queued)
                | (Running, Verifying)
                | (Verifying, Complete)
                | (Verifying, Failed)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Queued => "queued",
            TaskState::Assigned => "assigned",
            TaskState::Running => "running",
            TaskState::Verifying => "verifying",
            TaskState::Complete => "complete",
            TaskState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Reason a task reached `Failed`, carried for observability (spec §7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    ExitCode(i32),
    RepeatedWorkerCrash,
    AcceptanceFailed,
    DeceptiveClaim,
    PhaseTimeout,
    Killed { reason: String },
    Shutdown,
    PtySpawnError(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ExitCode(code) => write!(f, "exit code {code}"),
            FailureReason::RepeatedWorkerCrash => write!(f, "repeated_worker_crash"),
            FailureReason::AcceptanceFailed => write!(f, "acceptance_failed"),
            FailureReason::DeceptiveClaim => write!(f, "deceptive_claim"),
            FailureReason::PhaseTimeout => write!(f, "phase_timeout"),
            FailureReason::Killed { reason } => write!(f, "killed: {reason}"),
            FailureReason::Shutdown => write!(f, "shutdown"),
            FailureReason::PtySpawnError(msg) => write!(f, "pty_spawn_error: {msg}"),
        }
    }
}

/// Acceptance criteria evaluated once a task's child exits 0 (spec §4.1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceCriteria {
    /// Paths (relative to the controller's working directory) that must
    /// exist and be non-empty for the task to pass verification.
    #[serde(default)]
    pub files_expected: HashSet<PathBuf>,
    /// Whether at least one test-invocation-shaped command must have been
    /// observed in the session.
    #[serde(default)]
    pub tests_required: bool,
    /// Whether that test invocation must have exited 0.
    #[serde(default)]
    pub tests_must_pass: bool,
    /// Opaque names of custom predicates to run; resolved by the caller
    /// supplying predicate implementations (§4.1: "opaque functions").
    #[serde(default)]
    pub custom_predicates: Vec<String>,
}

impl AcceptanceCriteria {
    pub fn is_empty(&self) -> bool {
        self.files_expected.is_empty()
            && !self.tests_required
            && self.custom_predicates.is_empty()
    }
}

/// Which check failed during acceptance verification, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum AcceptanceFailure {
    MissingFile { path: PathBuf },
    FileTooSmall { path: PathBuf, bytes: u64 },
    NoTestInvocationObserved,
    TestsFailed { exit_code: i32 },
    CustomPredicateFailed { name: String },
    DeceptiveClaim { pattern: String },
}

/// Structured report produced by one acceptance verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceReport {
    pub failures: Vec<AcceptanceFailure>,
}

impl AcceptanceReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Options accepted by `Supervisor::submit` (spec §4.1).
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    pub parent_id: Option<TaskId>,
    pub priority: i64,
    pub acceptance: AcceptanceCriteria,
    pub phase_scope: Option<PhaseName>,
}

/// One unit of work tracked by the Supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub parent_id: Option<TaskId>,
    pub prompt: String,
    pub priority: i64,
    pub state: TaskState,
    pub acceptance: AcceptanceCriteria,
    pub phase_scope: Option<PhaseName>,
    pub created_at_ms: u64,
    pub assigned_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
    pub worker_id: Option<WorkerId>,
    pub result: Option<TaskResult>,
    /// Number of times this task has been assigned (for worker-crash retry
    /// accounting — spec §4.1 "repeated_worker_crash").
    pub attempt: u32,
}

/// Terminal outcome recorded on a task once it reaches `complete`/`failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub exit_code: Option<i32>,
    pub failure_reason: Option<FailureReason>,
    pub acceptance_report: Option<AcceptanceReport>,
}

impl Task {
    pub fn new(id: TaskId, prompt: String, opts: SubmitOptions, created_at_ms: u64) -> Self {
        Self {
            id,
            parent_id: opts.parent_id,
            prompt,
            priority: opts.priority,
            state: TaskState::Queued,
            acceptance: opts.acceptance,
            phase_scope: opts.phase_scope,
            created_at_ms,
            assigned_at_ms: None,
            completed_at_ms: None,
            worker_id: None,
            result: None,
            attempt: 0,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
