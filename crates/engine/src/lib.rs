// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-engine: the scheduling and execution core of the supervised
//! execution controller — Task table, priority queue, acceptance
//! verification, PTY Executor, Worker pool, Supervisor, and Phase
//! Controller.

mod acceptance;
mod error;
mod phase_controller;
mod pty_executor;
mod queue;
mod supervisor;
mod task_table;
mod worker;

pub use acceptance::{artifact_satisfied, matching_paths, CustomPredicate, DEFAULT_MIN_FILE_BYTES};
pub use error::{PhaseError, SupervisorError};
pub use phase_controller::{default_phases, phase_env, PhaseController};
pub use pty_executor::{PtyExecutor, PtyExecutorConfig, PtyExecutorError, SpawnChildRequest};
pub use supervisor::{
    spawn, SpawnSpecFn, StatusSnapshot, SupervisorConfig, SupervisorHandle, WorkerPoolSummary,
};
pub use worker::{WorkerError, WorkerOutcome, WorkerSlot};
