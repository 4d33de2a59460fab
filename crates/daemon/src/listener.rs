// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O (spec §4.4).
//!
//! Accepts connections and dispatches each request to the Supervisor (and,
//! for `RunCycle`, a Phase Controller) without blocking other connections.
//! A connection that sends `Subscribe` is held open and receives every
//! matching event from the broadcast fan-out until it disconnects; every
//! other request gets exactly one response and the connection closes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, Notify};
use tracing::{debug, error, info, warn};
use warden_core::{AcceptanceCriteria, Event, FailureReason, PhaseConfig, SystemClock, TaskId};
use warden_engine::{PhaseController, SupervisorHandle};

use crate::protocol::{self, ProtocolError, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};

/// Shared daemon context handed to every connection handler.
pub struct ListenCtx {
    pub supervisor: SupervisorHandle,
    /// Fan-out of every event the Supervisor emits, for `Subscribe` clients
    /// and ad-hoc `RunCycle` phase controllers alike (see `events.rs`-style
    /// split: one true receiver, many broadcast subscribers).
    pub events: broadcast::Sender<Event>,
    pub phases: Vec<PhaseConfig>,
    /// Working directory artifacts are resolved against (spec §6 "Artifact
    /// gating... relative to the controller's working directory").
    pub root: PathBuf,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

/// Accepts connections on a Unix socket and spawns one task per connection.
pub struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenCtx>,
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { socket, ctx }
    }

    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                ProtocolError::ConnectionClosed => debug!("client disconnected"),
                                ProtocolError::Timeout => warn!("connection timeout"),
                                other => error!(error = %other, "connection error"),
                            }
                        }
                    });
                }
                Err(e) => error!(error = %e, "accept error"),
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: &ListenCtx) -> Result<(), ProtocolError> {
    let (mut reader, mut writer) = stream.into_split();
    let request = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;

    if let Request::Subscribe { task_id } = request {
        return stream_events(&mut writer, ctx, task_id).await;
    }

    info!(request = ?request, "received request");
    let response = handle_request(request, ctx).await;
    debug!(response = ?response, "sending response");
    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await
}

/// Hold the connection open, relaying every broadcast event (optionally
/// filtered to one task) until the client disconnects or falls behind.
async fn stream_events<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    ctx: &ListenCtx,
    task_filter: Option<String>,
) -> Result<(), ProtocolError> {
    let mut rx = ctx.events.subscribe();
    let task_filter = task_filter.map(TaskId::new);
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(wanted) = &task_filter {
                    if event.task_id.as_ref() != Some(wanted) {
                        continue;
                    }
                }
                protocol::write_response(writer, &Response::Event { event }, DEFAULT_TIMEOUT).await?;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "subscriber lagged behind event stream, continuing");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }
}

async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::Hello { version: _ } => Response::Hello { version: PROTOCOL_VERSION.to_string() },
        Request::Subscribe { .. } => unreachable!("handled by stream_events before dispatch"),

        Request::Submit { prompt, priority, acceptance, phase_scope } => {
            submit(ctx, prompt, priority, acceptance, phase_scope).await
        }

        Request::Intervene { task_id, text } => match ctx.supervisor.intervene(TaskId::new(task_id), text).await {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error { message: e.to_string() },
        },

        Request::Kill { task_id, reason } => {
            let reason = FailureReason::Killed { reason: reason.unwrap_or_else(|| "client request".to_string()) };
            match ctx.supervisor.kill(TaskId::new(task_id), reason).await {
                Ok(()) => Response::Ok,
                Err(e) => Response::Error { message: e.to_string() },
            }
        }

        // No shipped rule declares an approval gate in this implementation
        // (see DESIGN.md); accepted for protocol completeness but always
        // reports there is nothing to approve/deny.
        Request::Approve { task_id } | Request::Deny { task_id } => {
            Response::Error { message: format!("task {task_id} has no pending approval gate") }
        }

        Request::Status => Response::Status { snapshot: ctx.supervisor.status().await },

        Request::RunCycle { prompt } => run_cycle(ctx, prompt).await,

        Request::Shutdown { kill } => {
            if kill {
                let snapshot = ctx.supervisor.status().await;
                for task in snapshot.recent_tasks {
                    if !task.state.is_terminal() {
                        let _ = ctx
                            .supervisor
                            .kill(task.id, FailureReason::Killed { reason: "daemon shutdown".to_string() })
                            .await;
                    }
                }
            }
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

async fn submit(
    ctx: &ListenCtx,
    prompt: String,
    priority: i64,
    acceptance: AcceptanceCriteria,
    phase_scope: Option<String>,
) -> Response {
    let opts = warden_core::SubmitOptions { parent_id: None, priority, acceptance, phase_scope };
    match ctx.supervisor.submit(prompt, opts).await {
        Ok(task_id) => Response::Submitted { task_id: task_id.to_string() },
        Err(e) => Response::Error { message: e.to_string() },
    }
}

/// Run one phase-controller cycle against a fresh broadcast subscription,
/// adapted into the `mpsc::Receiver<Event>` `PhaseController` expects.
async fn run_cycle(ctx: &ListenCtx, prompt: String) -> Response {
    let mut broadcast_rx = ctx.events.subscribe();
    let (tx, mut mpsc_rx) = mpsc::channel(1024);
    let forward = tokio::spawn(async move {
        while let Ok(event) = broadcast_rx.recv().await {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    let controller =
        PhaseController::new(ctx.supervisor.clone(), ctx.phases.clone(), SystemClock, std::time::Duration::from_secs(1));
    let result = controller.run_cycle(&mut mpsc_rx, &ctx.root, prompt).await;
    forward.abort();

    match result {
        Ok(report) => Response::CycleResult { report },
        Err(e) => Response::Error { message: e.to_string() },
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
