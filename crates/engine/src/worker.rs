// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker (spec §4.3): bridges one Supervisor-assigned task to one PTY
//! Executor. Workers are logically independent and never share mutable
//! state with each other; all cross-worker coordination goes through the
//! Supervisor.

use crate::pty_executor::{PtyExecutor, PtyExecutorConfig, PtyExecutorError, SpawnChildRequest};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use warden_adapters::{PtyAdapter, SpawnSpec};
use warden_core::{Detection, Event, EventKind, TaskId, WorkerId};
use warden_rules::RuleSet;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Executor(#[from] PtyExecutorError),
}

/// What a completed or crashed assignment hands back to the Supervisor.
#[derive(Debug, Clone)]
pub enum WorkerOutcome {
    /// The child exited with a real exit status; the task can proceed to
    /// acceptance verification.
    Completed {
        task_id: TaskId,
        worker_id: WorkerId,
        exit_code: i32,
        output: String,
        violations: Vec<Detection>,
        tool_calls: Vec<Value>,
    },
    /// The session ended without a real exit status (pty spawn failure
    /// after assignment, or the output channel closing unexpectedly) —
    /// spec §4.1 "worker thread/process dies": requeue, don't fail outright.
    Crashed {
        task_id: TaskId,
        worker_id: WorkerId,
        message: String,
    },
}

/// A single pool slot: one long-lived [`PtyExecutor`] reused across
/// successive assignments (`execute` is single-shot but resets to idle on
/// exit, so the same slot serves the next task).
pub struct WorkerSlot<P: PtyAdapter + 'static> {
    pub id: WorkerId,
    executor: PtyExecutor<P>,
}

impl<P: PtyAdapter + 'static> WorkerSlot<P> {
    pub fn new(id: WorkerId, adapter: Arc<P>, config: PtyExecutorConfig) -> Self {
        Self {
            id,
            executor: PtyExecutor::new(adapter, config),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.executor.is_running()
    }

    /// Re-brand this slot under a fresh identity after its previous
    /// occupant crashed (spec §4.1 "a replacement worker is spawned").
    /// The underlying executor is already idle by the time a crash is
    /// reported, so the pty/adapter capacity is reused; only the logical
    /// worker identity changes.
    pub fn replace_id(&mut self, new_id: WorkerId) -> WorkerId {
        std::mem::replace(&mut self.id, new_id)
    }

    pub async fn intervene(&self, text: String, escape_first: bool) -> Result<(), WorkerError> {
        self.executor.force_intervention(text, escape_first).await.map_err(Into::into)
    }

    pub async fn terminate(&self) -> Result<(), WorkerError> {
        self.executor.kill().await.map_err(Into::into)
    }

    /// Start `task_id` on this slot. Spawns a background task that relays
    /// every executor event upward (already tagged with `{task_id,
    /// worker_id}` by the executor) and, on `exit`, resolves the assignment
    /// into a single [`WorkerOutcome`] sent on `outcome_tx`.
    #[allow(clippy::too_many_arguments)]
    pub async fn assign(
        &self,
        task_id: TaskId,
        spec: SpawnSpec,
        ruleset: Arc<RuleSet>,
        phase: Option<String>,
        upstream_event_tx: mpsc::Sender<Event>,
        spawn_tx: mpsc::Sender<SpawnChildRequest>,
        outcome_tx: mpsc::Sender<WorkerOutcome>,
    ) -> Result<(), WorkerError> {
        let (local_tx, mut local_rx) = mpsc::channel(256);
        self.executor
            .execute(
                spec,
                task_id.clone(),
                self.id.clone(),
                ruleset,
                phase,
                local_tx,
                spawn_tx,
            )
            .await?;

        let executor = self.executor.clone();
        let worker_id = self.id.clone();

        tokio::spawn(async move {
            let mut tool_calls = Vec::new();

            while let Some(event) = local_rx.recv().await {
                if let EventKind::ToolCall { payload } = &event.kind {
                    tool_calls.push(payload.clone());
                }

                if let EventKind::Exit { exit_code, .. } = &event.kind {
                    let exit_code = *exit_code;
                    let _ = upstream_event_tx.send(event).await;

                    let outcome = match exit_code {
                        Some(code) => WorkerOutcome::Completed {
                            task_id: task_id.clone(),
                            worker_id: worker_id.clone(),
                            exit_code: code,
                            output: executor.get_output(),
                            violations: executor.get_violations(),
                            tool_calls,
                        },
                        None => WorkerOutcome::Crashed {
                            task_id: task_id.clone(),
                            worker_id: worker_id.clone(),
                            message: "pty session ended without an exit status".to_string(),
                        },
                    };
                    let _ = outcome_tx.send(outcome).await;
                    return;
                }

                let _ = upstream_event_tx.send(event).await;
            }

            // Local channel closed without ever seeing `exit` — the
            // forwarder task itself is the thing that died.
            let _ = outcome_tx
                .send(WorkerOutcome::Crashed {
                    task_id,
                    worker_id,
                    message: "worker event relay closed unexpectedly".to_string(),
                })
                .await;
        });

        Ok(())
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
