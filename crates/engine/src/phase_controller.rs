// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase Controller (spec §4.5): runs a fixed, named sequence of tasks
//! through the Supervisor, each time-boxed and tool-restricted, chaining
//! one phase's output artifact into the next phase's prompt.
//!
//! Tool restrictions driven by output *content* (e.g. "I would...") are
//! already handled by the Rule Set's `phase_scope` filter inside the PTY
//! Executor. This module only enforces the phase table's explicit
//! `forbidden_tools` list, which needs the tool name out of a `ToolCall`
//! event rather than a regex match on the stream.

use crate::error::PhaseError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use warden_core::{
    Clock, CycleReport, Event, EventKind, PhaseConfig, PhaseOutcome, PhaseRun, SubmitOptions,
    TaskId, Violation,
};

use crate::supervisor::SupervisorHandle;

/// Environment variables a cooperating child can read to learn its current
/// restrictions (spec §6 "Child-process contract").
pub fn phase_env(phase: &PhaseConfig, cwd: &str) -> Vec<(String, String)> {
    vec![
        ("CONTROLLER_PHASE".to_string(), phase.name.clone()),
        (
            "CONTROLLER_ALLOWED_TOOLS".to_string(),
            phase.allowed_tools.iter().cloned().collect::<Vec<_>>().join(","),
        ),
        (
            "CONTROLLER_FORBIDDEN_TOOLS".to_string(),
            phase.forbidden_tools.iter().cloned().collect::<Vec<_>>().join(","),
        ),
        ("CONTROLLER_CWD".to_string(), cwd.to_string()),
    ]
}

/// The default research/planning/execution/integration sequence (spec
/// §4.5's phase table).
pub fn default_phases() -> Vec<PhaseConfig> {
    vec![
        PhaseConfig {
            name: "research".to_string(),
            duration_minutes: 3,
            allowed_tools: ["read", "search"].iter().map(|s| s.to_string()).collect(),
            forbidden_tools: ["write", "edit"].iter().map(|s| s.to_string()).collect(),
            output_artifact: "research-findings.md".to_string(),
            success_regex: None,
            parallel: false,
        },
        PhaseConfig {
            name: "planning".to_string(),
            duration_minutes: 3,
            allowed_tools: ["read"].iter().map(|s| s.to_string()).collect(),
            forbidden_tools: ["write", "search"].iter().map(|s| s.to_string()).collect(),
            output_artifact: "task-plan.json".to_string(),
            success_regex: None,
            parallel: false,
        },
        PhaseConfig {
            name: "execution".to_string(),
            duration_minutes: 10,
            allowed_tools: ["write", "mkdir"].iter().map(|s| s.to_string()).collect(),
            forbidden_tools: ["read", "search"].iter().map(|s| s.to_string()).collect(),
            output_artifact: "implementation/*".to_string(),
            success_regex: None,
            parallel: true,
        },
        PhaseConfig {
            name: "integration".to_string(),
            duration_minutes: 3,
            allowed_tools: ["read", "write", "edit"].iter().map(|s| s.to_string()).collect(),
            forbidden_tools: ["search"].iter().map(|s| s.to_string()).collect(),
            output_artifact: "integrated-solution.*".to_string(),
            success_regex: None,
            parallel: false,
        },
    ]
}

/// Parsed shape of the execution phase's input plan, when the previous
/// phase's artifact is machine-readable JSON (spec §4.5 point 5).
#[derive(Debug, Deserialize)]
struct SubtaskPlan {
    subtasks: Vec<Subtask>,
}

#[derive(Debug, Deserialize)]
struct Subtask {
    prompt: String,
    artifact: String,
}

pub struct PhaseController<C: Clock> {
    supervisor: SupervisorHandle,
    phases: Vec<PhaseConfig>,
    clock: C,
    poll_interval: Duration,
}

impl<C: Clock> PhaseController<C> {
    pub fn new(supervisor: SupervisorHandle, phases: Vec<PhaseConfig>, clock: C, poll_interval: Duration) -> Self {
        Self { supervisor, phases, clock, poll_interval }
    }

    /// Run the full phase sequence once, chaining each phase's artifact
    /// into the next. Stops at the first phase that doesn't succeed.
    pub async fn run_cycle(
        &self,
        event_rx: &mut mpsc::Receiver<Event>,
        root: &Path,
        initial_prompt: String,
    ) -> Result<CycleReport, PhaseError> {
        let mut runs = Vec::new();
        let mut failed_phase = None;
        let mut chained_input = initial_prompt;
        let mut degraded = false;

        for phase in &self.phases {
            let run = if phase.parallel {
                self.run_parallel_phase(event_rx, root, phase, &chained_input).await?
            } else {
                self.run_single_phase(event_rx, root, phase, &chained_input).await?
            };

            let succeeded = run.outcome == Some(PhaseOutcome::Success);
            let artifact_path = run.artifacts_found.first().cloned();
            runs.push(run);

            if !succeeded {
                failed_phase = Some(phase.name.clone());
                break;
            }

            if let Some(path) = artifact_path {
                match read_artifact(root, &path) {
                    Ok(contents) => chained_input = contents,
                    Err(()) => {
                        // Artifact was found but couldn't be read; the next
                        // phase falls back to the previous input (spec §4.5
                        // "downstream phases could not consume their input").
                        degraded = true;
                    }
                }
            }
        }

        Ok(CycleReport { runs, failed_phase, degraded })
    }

    async fn run_single_phase(
        &self,
        event_rx: &mut mpsc::Receiver<Event>,
        root: &Path,
        phase: &PhaseConfig,
        input: &str,
    ) -> Result<PhaseRun, PhaseError> {
        let started_at_ms = self.clock.now_ms();
        let opts = SubmitOptions {
            phase_scope: Some(phase.name.clone()),
            ..Default::default()
        };
        let task_id = self
            .supervisor
            .submit(phase_prompt(phase, input), opts)
            .await
            .map_err(|source| PhaseError::Supervisor { phase: phase.name.clone(), source })?;

        let tasks: HashSet<TaskId> = [task_id.clone()].into_iter().collect();
        let (outcome, violations) = self.watch_phase(event_rx, root, phase, &tasks).await;

        let _ = self.supervisor.kill(task_id, warden_core::FailureReason::PhaseTimeout).await;

        let artifacts_found = crate::acceptance::matching_paths(root, &phase.output_artifact)
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        Ok(PhaseRun {
            phase_name: phase.name.clone(),
            started_at_ms,
            finished_at_ms: Some(self.clock.now_ms()),
            outcome: Some(outcome),
            violations,
            artifacts_found,
        })
    }

    async fn run_parallel_phase(
        &self,
        event_rx: &mut mpsc::Receiver<Event>,
        root: &Path,
        phase: &PhaseConfig,
        input: &str,
    ) -> Result<PhaseRun, PhaseError> {
        let started_at_ms = self.clock.now_ms();
        let plan: Option<SubtaskPlan> = serde_json::from_str(input).ok();

        let subtasks = match plan {
            Some(plan) if !plan.subtasks.is_empty() => plan.subtasks,
            // No machine-readable plan: fall back to running the whole
            // phase as a single task against the chained input.
            _ => {
                return self.run_single_phase(event_rx, root, phase, input).await;
            }
        };

        let mut tasks = HashSet::new();
        for sub in &subtasks {
            let opts = SubmitOptions {
                phase_scope: Some(phase.name.clone()),
                ..Default::default()
            };
            let task_id = self
                .supervisor
                .submit(sub.prompt.clone(), opts)
                .await
                .map_err(|source| PhaseError::Supervisor { phase: phase.name.clone(), source })?;
            tasks.insert(task_id);
        }

        let (outcome, violations) = self
            .watch_phase_until(event_rx, root, phase, &tasks, |root| {
                subtasks.iter().all(|s| crate::acceptance::artifact_satisfied(root, &s.artifact))
            })
            .await;

        for task_id in &tasks {
            let _ = self
                .supervisor
                .kill(task_id.clone(), warden_core::FailureReason::PhaseTimeout)
                .await;
        }

        let artifacts_found = subtasks
            .iter()
            .flat_map(|s| crate::acceptance::matching_paths(root, &s.artifact))
            .map(|p| p.to_string_lossy().into_owned())
            .collect();

        Ok(PhaseRun {
            phase_name: phase.name.clone(),
            started_at_ms,
            finished_at_ms: Some(self.clock.now_ms()),
            outcome: Some(outcome),
            violations,
            artifacts_found,
        })
    }

    async fn watch_phase(
        &self,
        event_rx: &mut mpsc::Receiver<Event>,
        root: &Path,
        phase: &PhaseConfig,
        tasks: &HashSet<TaskId>,
    ) -> (PhaseOutcome, Vec<Violation>) {
        let pattern = phase.output_artifact.clone();
        self.watch_phase_until(event_rx, root, phase, tasks, move |root| {
            crate::acceptance::artifact_satisfied(root, &pattern)
        })
        .await
    }

    /// Poll `satisfied` at `poll_interval` cadence while relaying
    /// `ToolCall` events for this phase's tasks into forbidden-tool
    /// interventions, until `satisfied` returns true or the phase's
    /// deadline elapses.
    async fn watch_phase_until(
        &self,
        event_rx: &mut mpsc::Receiver<Event>,
        root: &Path,
        phase: &PhaseConfig,
        tasks: &HashSet<TaskId>,
        satisfied: impl Fn(&Path) -> bool,
    ) -> (PhaseOutcome, Vec<Violation>) {
        let deadline = self.clock.now() + Duration::from_secs(phase.duration_minutes * 60);
        let mut violations = Vec::new();

        loop {
            if satisfied(root) {
                return (PhaseOutcome::Success, violations);
            }
            if self.clock.now() >= deadline {
                return (PhaseOutcome::Timeout, violations);
            }

            while let Ok(Some(event)) = tokio::time::timeout(Duration::from_millis(1), event_rx.recv()).await {
                if !tasks.contains(&event.task_id.clone().unwrap_or_default()) {
                    continue;
                }
                if let EventKind::ToolCall { payload } = &event.kind {
                    if let Some(tool) = tool_name(payload) {
                        if phase.forbidden_tools.contains(&tool) {
                            if let Some(task_id) = &event.task_id {
                                let text = format!("Tool '{tool}' is forbidden in the {} phase.", phase.name);
                                let _ = self.supervisor.intervene_escalated(task_id.clone(), text).await;
                            }
                            violations.push(Violation { tool, at_ms: self.clock.now_ms() });
                        }
                    }
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn tool_name(payload: &Value) -> Option<String> {
    payload.get("tool").and_then(Value::as_str).map(str::to_string)
}

/// Read a phase's output artifact to chain into the next phase's prompt.
/// `Err(())` means the artifact was found by the phase's glob but could
/// not be read back (e.g. removed or replaced between the glob scan and
/// this read).
fn read_artifact(root: &Path, rel_path: &Path) -> Result<String, ()> {
    std::fs::read_to_string(root.join(rel_path)).map_err(|_| ())
}

/// The system message handed to a phase's task, chained with either the
/// initial user prompt (phase 1) or the previous phase's artifact
/// contents (spec §4.5 point 1).
fn phase_prompt(phase: &PhaseConfig, input: &str) -> String {
    format!("[phase: {}]\n{}", phase.name, input)
}

#[cfg(test)]
#[path = "phase_controller_tests.rs"]
mod tests;
