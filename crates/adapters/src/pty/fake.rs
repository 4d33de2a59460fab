// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory pty adapter for tests. Records every call so assertions can
//! check what the engine asked of the pty, and lets tests feed synthetic
//! output without spawning a real process.

#![cfg(any(test, feature = "test-support"))]

use super::{PtyOutput, SpawnSpec};
use crate::error::PtyError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One recorded interaction with a [`FakePtyAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub enum PtyCall {
    Spawn(SpawnSpec),
    Write(Vec<u8>),
    Resize { cols: u16, rows: u16 },
    Kill,
}

struct State {
    calls: Vec<PtyCall>,
    alive: bool,
    sender: Option<mpsc::Sender<PtyOutput>>,
}

/// Test double for [`super::PtyAdapter`]. Clone to share the same recorded
/// state between the adapter under test and the assertions checking it.
#[derive(Clone)]
pub struct FakePtyAdapter {
    state: Arc<Mutex<State>>,
}

impl FakePtyAdapter {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                calls: Vec::new(),
                alive: false,
                sender: None,
            })),
        }
    }

    /// Snapshot of every call made so far, in order.
    pub fn calls(&self) -> Vec<PtyCall> {
        self.state.lock().calls.clone()
    }

    /// Push a synthetic output chunk as if it had been read off the pty.
    /// No-op if nothing has called `spawn` yet or the receiver was dropped.
    pub async fn push_output(&self, chunk: impl Into<String>) {
        let sender = self.state.lock().sender.clone();
        if let Some(sender) = sender {
            let _ = sender.send(PtyOutput::Chunk(chunk.into())).await;
        }
    }

    /// Simulate the child process exiting.
    pub async fn push_exit(&self, exit_code: Option<i32>, signal: Option<i32>) {
        let sender = {
            let mut guard = self.state.lock();
            guard.alive = false;
            guard.sender.clone()
        };
        if let Some(sender) = sender {
            let _ = sender.send(PtyOutput::Exited { exit_code, signal }).await;
        }
    }
}

impl Default for FakePtyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::PtyAdapter for FakePtyAdapter {
    async fn spawn(&self, spec: SpawnSpec) -> Result<mpsc::Receiver<PtyOutput>, PtyError> {
        let (tx, rx) = mpsc::channel(256);
        let mut guard = self.state.lock();
        if guard.alive {
            return Err(PtyError::AlreadyRunning);
        }
        guard.calls.push(PtyCall::Spawn(spec));
        guard.alive = true;
        guard.sender = Some(tx);
        Ok(rx)
    }

    async fn write(&self, data: &[u8]) -> Result<(), PtyError> {
        let mut guard = self.state.lock();
        if !guard.alive {
            return Err(PtyError::NotRunning);
        }
        guard.calls.push(PtyCall::Write(data.to_vec()));
        Ok(())
    }

    async fn resize(&self, cols: u16, rows: u16) -> Result<(), PtyError> {
        self.state.lock().calls.push(PtyCall::Resize { cols, rows });
        Ok(())
    }

    async fn kill(&self) -> Result<(), PtyError> {
        let mut guard = self.state.lock();
        guard.calls.push(PtyCall::Kill);
        guard.alive = false;
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        self.state.lock().alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pty::PtyAdapter;

    #[tokio::test]
    async fn records_spawn_write_kill_in_order() {
        let fake = FakePtyAdapter::new();
        let mut rx = fake.spawn(SpawnSpec::new("claude")).await.unwrap();
        fake.write(b"hello\n").await.unwrap();
        fake.push_output("world").await;
        fake.kill().await.unwrap();

        assert_eq!(fake.calls().len(), 3);
        assert!(matches!(fake.calls()[0], PtyCall::Spawn(_)));
        assert!(matches!(&fake.calls()[1], PtyCall::Write(d) if d == b"hello\n"));
        assert!(matches!(fake.calls()[2], PtyCall::Kill));

        match rx.recv().await.unwrap() {
            PtyOutput::Chunk(s) => assert_eq!(s, "world"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!fake.is_alive().await);
    }

    #[tokio::test]
    async fn double_spawn_errors() {
        let fake = FakePtyAdapter::new();
        let _rx = fake.spawn(SpawnSpec::new("claude")).await.unwrap();
        let err = fake.spawn(SpawnSpec::new("claude")).await.unwrap_err();
        assert!(matches!(err, PtyError::AlreadyRunning));
    }

    #[tokio::test]
    async fn write_before_spawn_errors() {
        let fake = FakePtyAdapter::new();
        let err = fake.write(b"x").await.unwrap_err();
        assert!(matches!(err, PtyError::NotRunning));
    }

    #[tokio::test]
    async fn push_exit_marks_dead_and_forwards_code() {
        let fake = FakePtyAdapter::new();
        let mut rx = fake.spawn(SpawnSpec::new("claude")).await.unwrap();
        fake.push_exit(Some(1), None).await;
        match rx.recv().await.unwrap() {
            PtyOutput::Exited { exit_code, .. } => assert_eq!(exit_code, Some(1)),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!fake.is_alive().await);
    }
}
