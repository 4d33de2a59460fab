// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommand definitions and their daemon-facing implementations.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use warden_core::AcceptanceCriteria;
use warden_daemon::protocol::{Request, Response};

use crate::client::DaemonClient;

#[derive(Subcommand)]
pub enum Command {
    /// Check whether the daemon is reachable.
    Ping,

    /// Create a new task.
    Submit {
        /// Prompt text handed to the worker.
        prompt: String,

        /// Scheduling priority; higher runs first.
        #[arg(long, default_value_t = 0)]
        priority: i64,

        /// Phase to run the task under (see `wardend`'s configured phases).
        #[arg(long)]
        phase: Option<String>,

        /// Paths that must exist and be non-empty for acceptance to pass.
        /// Repeatable.
        #[arg(long = "expect-file")]
        expect_file: Vec<PathBuf>,

        /// Require at least one test invocation to have run.
        #[arg(long)]
        tests_required: bool,

        /// Require that test invocation to have exited 0.
        #[arg(long)]
        tests_must_pass: bool,
    },

    /// Deliver corrective text to a running task.
    Intervene {
        /// Task ID to intervene on.
        task_id: String,
        /// Text delivered to the worker's terminal.
        text: String,
    },

    /// Terminate a task.
    Kill {
        /// Task ID to kill.
        task_id: String,
        /// Optional reason recorded on the task's failure.
        #[arg(long)]
        reason: Option<String>,
    },

    /// Show current supervisor status.
    Status,

    /// Run one phase-controller cycle against a fresh prompt.
    Phase {
        /// Prompt text to run through the configured phase pipeline.
        prompt: String,
    },

    /// Approve a pending gate on a task.
    Approve {
        /// Task ID to approve.
        task_id: String,
    },

    /// Deny a pending gate on a task.
    Deny {
        /// Task ID to deny.
        task_id: String,
    },

    /// Stream live events, optionally filtered to one task.
    Subscribe {
        /// Only show events for this task ID.
        #[arg(long)]
        task_id: Option<String>,
    },

    /// Ask the daemon to shut down.
    Shutdown {
        /// Kill all in-flight tasks before stopping.
        #[arg(long)]
        kill: bool,
    },
}

impl Command {
    pub async fn run(self, client: DaemonClient) -> Result<()> {
        match self {
            Command::Ping => {
                match client.send(&Request::Ping).await? {
                    Response::Pong => println!("pong"),
                    other => anyhow::bail!("unexpected response: {other:?}"),
                }
            }
            Command::Submit { prompt, priority, phase, expect_file, tests_required, tests_must_pass } => {
                let acceptance = AcceptanceCriteria {
                    files_expected: expect_file.into_iter().collect::<HashSet<_>>(),
                    tests_required,
                    tests_must_pass,
                    ..Default::default()
                };
                let request = Request::Submit { prompt, priority, acceptance, phase_scope: phase };
                match client.send(&request).await? {
                    Response::Submitted { task_id } => println!("{task_id}"),
                    Response::Error { message } => anyhow::bail!("daemon rejected submission: {message}"),
                    other => anyhow::bail!("unexpected response: {other:?}"),
                }
            }
            Command::Intervene { task_id, text } => {
                client.send_simple(&Request::Intervene { task_id, text }).await.context("intervene")?;
                println!("ok");
            }
            Command::Kill { task_id, reason } => {
                client.send_simple(&Request::Kill { task_id, reason }).await.context("kill")?;
                println!("ok");
            }
            Command::Status => {
                match client.send(&Request::Status).await? {
                    Response::Status { snapshot } => print_status(&snapshot),
                    other => anyhow::bail!("unexpected response: {other:?}"),
                }
            }
            Command::Phase { prompt } => {
                match client.send(&Request::RunCycle { prompt }).await? {
                    Response::CycleResult { report } => print_cycle_report(&report),
                    other => anyhow::bail!("unexpected response: {other:?}"),
                }
            }
            Command::Approve { task_id } => {
                client.send_simple(&Request::Approve { task_id }).await.context("approve")?;
                println!("ok");
            }
            Command::Deny { task_id } => {
                client.send_simple(&Request::Deny { task_id }).await.context("deny")?;
                println!("ok");
            }
            Command::Subscribe { task_id } => {
                client
                    .subscribe(task_id, |event| {
                        println!("{}", serde_json::to_string(&event).unwrap_or_else(|_| format!("{event:?}")));
                        true
                    })
                    .await
                    .context("subscribe")?;
            }
            Command::Shutdown { kill } => {
                match client.send(&Request::Shutdown { kill }).await? {
                    Response::ShuttingDown => println!("shutting down"),
                    other => anyhow::bail!("unexpected response: {other:?}"),
                }
            }
        }
        Ok(())
    }
}

fn print_status(snapshot: &warden_engine::StatusSnapshot) {
    println!(
        "queued={} assigned={} running={} verifying={} complete={} failed={} queue_depth={}",
        snapshot.queued,
        snapshot.assigned,
        snapshot.running,
        snapshot.verifying,
        snapshot.complete,
        snapshot.failed,
        snapshot.queue_depth,
    );
    println!("workers: {:?}", snapshot.workers);
    for task in &snapshot.recent_tasks {
        println!("  {} [{}]", task.id, task.state);
    }
}

fn print_cycle_report(report: &warden_core::CycleReport) {
    for run in &report.runs {
        let outcome = run.outcome.as_ref().map(|o| format!("{o:?}")).unwrap_or_else(|| "pending".to_string());
        println!("{}: {outcome}", run.phase_name);
        for violation in &run.violations {
            println!("  violation: {violation:?}");
        }
    }
    match &report.failed_phase {
        Some(phase) => println!("failed at phase {phase}"),
        None if report.degraded => println!("completed (degraded)"),
        None => println!("completed"),
    }
}
