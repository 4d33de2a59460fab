// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `PtyAdapter` trait: the seam between the scheduling engine and the
//! real pseudo-terminal backing each worker's agent process.
//!
//! Mirrors the shape of a session adapter: spawn, write, resize, kill, plus
//! a channel the caller polls for output chunks and exit notification.

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
pub mod real;

use crate::error::PtyError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One unit of output read off the pty, or the terminal notification that
/// the child process exited.
#[derive(Debug, Clone)]
pub enum PtyOutput {
    Chunk(String),
    Exited { exit_code: Option<i32>, signal: Option<i32> },
}

/// Parameters for spawning a worker's agent process under a pty.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnSpec {
    pub cmd: String,
    pub args: Vec<String>,
    pub cwd: Option<String>,
    pub env: Vec<(String, String)>,
    pub cols: u16,
    pub rows: u16,
}

impl SpawnSpec {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            cols: 120,
            rows: 40,
        }
    }
}

/// A handle to one running pty session.
///
/// Implementations must be safe to hold across `.await` points but must
/// never block the async runtime: reads happen on a dedicated blocking
/// task and are forwarded through `output()`.
#[async_trait]
pub trait PtyAdapter: Send + Sync {
    /// Spawn the process under a fresh pty, returning a receiver of output
    /// chunks and the terminal exit notification.
    async fn spawn(&self, spec: SpawnSpec) -> Result<mpsc::Receiver<PtyOutput>, PtyError>;

    /// Write bytes to the pty's input side (stdin of the child).
    async fn write(&self, data: &[u8]) -> Result<(), PtyError>;

    /// Resize the pty's window.
    async fn resize(&self, cols: u16, rows: u16) -> Result<(), PtyError>;

    /// Terminate the child process, best-effort.
    async fn kill(&self) -> Result<(), PtyError>;

    /// Whether the underlying process is still believed to be running.
    async fn is_alive(&self) -> bool;
}
