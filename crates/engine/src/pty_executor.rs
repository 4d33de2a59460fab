// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PTY Executor & Stream Pipeline (spec §4.2): owns one child process
//! attached to a pseudo-terminal, streams output to consumers, accepts
//! stdin writes for interventions, runs the keep-alive heartbeat, and
//! applies the Rule Set to detect patterns.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use warden_adapters::{PtyAdapter, PtyError, PtyOutput, SpawnSpec};
use warden_core::{Detection, Event, EventKind, Severity, TaskId, WorkerId};
use warden_rules::{RuleSet, SignalScanner, StreamMatcher, StructuredSignal};

/// Configuration for one PTY Executor session (spec §6 defaults).
#[derive(Debug, Clone)]
pub struct PtyExecutorConfig {
    pub heartbeat_interval: Duration,
    pub stream_window_chars: usize,
    pub stall_threshold: Duration,
    pub intervention_grace: Duration,
    pub output_buffer_bytes: usize,
}

impl Default for PtyExecutorConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(180),
            stream_window_chars: 1000,
            stall_threshold: Duration::from_secs(30),
            intervention_grace: Duration::from_millis(500),
            output_buffer_bytes: 1_000_000,
        }
    }
}

/// A request the child made in-band to create a child task (spec §4.2's
/// `SPAWN_CHILD` marker). Surfaced separately from the observational
/// `Event` stream because acting on it is the Supervisor's job, not an
/// observer's.
#[derive(Debug, Clone)]
pub struct SpawnChildRequest {
    pub task_id: TaskId,
    pub prompt: String,
    pub acceptance: serde_json::Value,
}

enum Command {
    Write(Vec<u8>),
    ForceIntervention(String, bool),
    Resize(u16, u16),
    Kill,
}

#[derive(Debug, thiserror::Error)]
pub enum PtyExecutorError {
    #[error("executor already running")]
    AlreadyRunning,
    #[error(transparent)]
    Pty(#[from] PtyError),
}

/// Handle to one running (or idle) PTY Executor. Cheap to clone; clones
/// share the same underlying session state.
pub struct PtyExecutor<P: PtyAdapter + 'static> {
    adapter: Arc<P>,
    config: PtyExecutorConfig,
    running: Arc<AtomicBool>,
    cmd_tx: Arc<Mutex<Option<mpsc::Sender<Command>>>>,
    output_buffer: Arc<Mutex<String>>,
    violations: Arc<Mutex<Vec<Detection>>>,
}

// Written by hand rather than `#[derive(Clone)]`: every field is already
// `Arc`-backed, so cloning never requires `P: Clone` — the adapter itself
// is never duplicated, only the handle to it.
impl<P: PtyAdapter + 'static> Clone for PtyExecutor<P> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
            config: self.config.clone(),
            running: Arc::clone(&self.running),
            cmd_tx: Arc::clone(&self.cmd_tx),
            output_buffer: Arc::clone(&self.output_buffer),
            violations: Arc::clone(&self.violations),
        }
    }
}

impl<P: PtyAdapter + 'static> PtyExecutor<P> {
    pub fn new(adapter: Arc<P>, config: PtyExecutorConfig) -> Self {
        Self {
            adapter,
            config,
            running: Arc::new(AtomicBool::new(false)),
            cmd_tx: Arc::new(Mutex::new(None)),
            output_buffer: Arc::new(Mutex::new(String::new())),
            violations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn get_output(&self) -> String {
        self.output_buffer.lock().clone()
    }

    pub fn get_violations(&self) -> Vec<Detection> {
        self.violations.lock().clone()
    }

    /// Start the child under a fresh pty and spawn the background
    /// processing loop. Single-shot: fails while a session is active.
    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        spec: SpawnSpec,
        task_id: TaskId,
        worker_id: WorkerId,
        ruleset: Arc<RuleSet>,
        phase: Option<String>,
        event_tx: mpsc::Sender<Event>,
        spawn_tx: mpsc::Sender<SpawnChildRequest>,
    ) -> Result<(), PtyExecutorError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(PtyExecutorError::AlreadyRunning);
        }

        let output_rx = match self.adapter.spawn(spec).await {
            Ok(rx) => rx,
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(err.into());
            }
        };

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        *self.cmd_tx.lock() = Some(cmd_tx);

        tokio::spawn(run_loop(
            Arc::clone(&self.adapter),
            self.config.clone(),
            output_rx,
            cmd_rx,
            ruleset,
            phase,
            task_id,
            worker_id,
            event_tx,
            spawn_tx,
            Arc::clone(&self.output_buffer),
            Arc::clone(&self.violations),
            Arc::clone(&self.running),
        ));

        Ok(())
    }

    pub async fn write(&self, data: Vec<u8>) -> Result<(), PtyExecutorError> {
        self.send_command(Command::Write(data)).await
    }

    /// Force-write a corrective message outside the Rule Set's own
    /// intervention path, used by callers that already know the exact
    /// text to deliver: the Phase Controller's forbidden-tool violations
    /// (spec §4.5, `escape_first = true`) and the operator-facing
    /// `intervene` command (spec §4.1, best-effort, `escape_first =
    /// false`).
    pub async fn force_intervention(&self, text: String, escape_first: bool) -> Result<(), PtyExecutorError> {
        self.send_command(Command::ForceIntervention(text, escape_first)).await
    }

    pub async fn resize(&self, cols: u16, rows: u16) -> Result<(), PtyExecutorError> {
        self.send_command(Command::Resize(cols, rows)).await
    }

    pub async fn kill(&self) -> Result<(), PtyExecutorError> {
        if !self.is_running() {
            return Ok(()); // idempotent
        }
        self.send_command(Command::Kill).await
    }

    async fn send_command(&self, cmd: Command) -> Result<(), PtyExecutorError> {
        let tx = self.cmd_tx.lock().clone();
        match tx {
            Some(tx) => {
                let _ = tx.send(cmd).await;
                Ok(())
            }
            None => Err(PtyExecutorError::Pty(PtyError::NotRunning)),
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_loop<P: PtyAdapter + 'static>(
    adapter: Arc<P>,
    config: PtyExecutorConfig,
    mut output_rx: mpsc::Receiver<PtyOutput>,
    mut cmd_rx: mpsc::Receiver<Command>,
    ruleset: Arc<RuleSet>,
    phase: Option<String>,
    task_id: TaskId,
    worker_id: WorkerId,
    event_tx: mpsc::Sender<Event>,
    spawn_tx: mpsc::Sender<SpawnChildRequest>,
    output_buffer: Arc<Mutex<String>>,
    violations: Arc<Mutex<Vec<Detection>>>,
    running: Arc<AtomicBool>,
) {
    let mut matcher = StreamMatcher::new(ruleset, config.stream_window_chars);
    let mut signals = SignalScanner::new();
    let mut heartbeat = tokio::time::interval(config.heartbeat_interval);
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let stall_check_period = (config.stall_threshold / 3).max(Duration::from_millis(100));
    let mut stall_check = tokio::time::interval(stall_check_period);
    let mut idle_since = tokio::time::Instant::now();
    let mut stall_reported = false;

    let emit = |kind: EventKind| Event::new(now_ms(), Some(task_id.clone()), Some(worker_id.clone()), kind);

    loop {
        tokio::select! {
            maybe_out = output_rx.recv() => {
                match maybe_out {
                    Some(PtyOutput::Chunk(chunk)) => {
                        idle_since = tokio::time::Instant::now();
                        stall_reported = false;

                        append_bounded(&output_buffer, &chunk, config.output_buffer_bytes);
                        let _ = event_tx.send(emit(EventKind::Data { chunk: chunk.clone() })).await;

                        for signal in signals.feed(&chunk) {
                            match signal {
                                StructuredSignal::ToolInvocation { payload } => {
                                    let _ = event_tx.send(emit(EventKind::ToolCall { payload })).await;
                                }
                                StructuredSignal::SpawnChild { prompt, acceptance } => {
                                    let _ = spawn_tx
                                        .send(SpawnChildRequest { task_id: task_id.clone(), prompt, acceptance })
                                        .await;
                                }
                            }
                        }

                        for m in matcher.feed(&chunk, phase.as_deref()) {
                            let detection = Detection {
                                rule_id: m.rule_id.clone(),
                                severity: m.severity,
                                matched_text: m.matched_text.clone(),
                                timestamp_ms: now_ms(),
                                task_id: task_id.clone(),
                                window_snapshot: matcher.window_snapshot().to_string(),
                            };
                            violations.lock().push(detection.clone());
                            let _ = event_tx.send(emit(EventKind::DetectionEvent { detection })).await;

                            if m.severity.intervenes() {
                                intervene(&adapter, &config, &m, &event_tx, &task_id, &worker_id).await;
                            }
                        }
                    }
                    Some(PtyOutput::Exited { exit_code, signal }) => {
                        info!(task_id = %task_id, exit_code, signal, "child exited");
                        let _ = event_tx.send(emit(EventKind::Exit { exit_code, signal })).await;
                        running.store(false, Ordering::SeqCst);
                        break;
                    }
                    None => {
                        error!(task_id = %task_id, "pty output channel closed unexpectedly");
                        let _ = event_tx
                            .send(emit(EventKind::Error { message: "pty output channel closed".into() }))
                            .await;
                        let _ = event_tx.send(emit(EventKind::Exit { exit_code: None, signal: None })).await;
                        running.store(false, Ordering::SeqCst);
                        break;
                    }
                }
            }

            _ = heartbeat.tick() => {
                if let Err(err) = adapter.write(&[0u8]).await {
                    warn!(task_id = %task_id, error = %err, "heartbeat write failed");
                }
                let _ = event_tx.send(emit(EventKind::Heartbeat)).await;
            }

            _ = stall_check.tick() => {
                if !stall_reported && idle_since.elapsed() >= config.stall_threshold {
                    stall_reported = true;
                    let idle_ms = idle_since.elapsed().as_millis() as u64;
                    let _ = event_tx.send(emit(EventKind::Stall { idle_ms })).await;
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(Command::Write(bytes)) => {
                        if let Err(err) = adapter.write(&bytes).await {
                            warn!(task_id = %task_id, error = %err, "intervention write failed");
                        }
                    }
                    Some(Command::ForceIntervention(text, escape_first)) => {
                        if escape_first {
                            // Spec §4.5: forbidden-tool violations get ESC before the
                            // corrective message, same as a rule-engine `interrupt`.
                            let _ = adapter.write(&[0x1B]).await;
                            tokio::time::sleep(config.intervention_grace).await;
                        }
                        let mut payload = text.clone();
                        payload.push('\n');
                        if let Err(err) = adapter.write(payload.as_bytes()).await {
                            warn!(task_id = %task_id, error = %err, "forced intervention write failed");
                        }
                        let _ = event_tx
                            .send(emit(EventKind::Intervention { rule_id: None, text, escalated: false }))
                            .await;
                    }
                    Some(Command::Resize(cols, rows)) => {
                        let _ = adapter.resize(cols, rows).await;
                    }
                    Some(Command::Kill) | None => {
                        let _ = adapter.kill().await;
                        running.store(false, Ordering::SeqCst);
                        break;
                    }
                }
            }
        }
    }
}

async fn intervene<P: PtyAdapter>(
    adapter: &Arc<P>,
    config: &PtyExecutorConfig,
    m: &warden_rules::RuleMatch,
    event_tx: &mpsc::Sender<Event>,
    task_id: &TaskId,
    worker_id: &WorkerId,
) {
    let text = m.corrective_message.clone().unwrap_or_default();

    let mut escalated = false;
    if m.severity == Severity::Interrupt {
        // ESC cancels current generation on most agent CLIs (spec §4.2).
        let _ = adapter.write(&[0x1B]).await;
        tokio::time::sleep(config.intervention_grace).await;

        if m.escalating && adapter.is_alive().await {
            // Child hasn't yielded after the grace period; escalate to Ctrl-C.
            let _ = adapter.write(&[0x03]).await;
            escalated = true;
        }
    }
    // `redirect` writes the corrective message without interrupting (spec §4.2).

    let mut payload = text.clone();
    payload.push('\n');
    let _ = adapter.write(payload.as_bytes()).await;

    let event = Event::new(
        now_ms(),
        Some(task_id.clone()),
        Some(worker_id.clone()),
        EventKind::Intervention {
            rule_id: Some(m.rule_id.as_str().to_string()),
            text,
            escalated,
        },
    );
    let _ = event_tx.send(event).await;
}

fn append_bounded(buffer: &Mutex<String>, chunk: &str, max_bytes: usize) {
    let mut guard = buffer.lock();
    guard.push_str(chunk);
    if guard.len() > max_bytes {
        let drop = guard.len() - max_bytes;
        let mut boundary = drop.min(guard.len());
        while boundary > 0 && !guard.is_char_boundary(boundary) {
            boundary -= 1;
        }
        guard.drain(..boundary);
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
#[path = "pty_executor_tests.rs"]
mod tests;
