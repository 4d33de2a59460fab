// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real pty backing, via `portable-pty`.

use super::{PtyOutput, SpawnSpec};
use crate::error::PtyError;
use async_trait::async_trait;
use parking_lot::Mutex;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use tokio::sync::mpsc;
use tracing::{debug, warn};

struct Session {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn Child + Send + Sync>,
}

/// Drives one worker's agent process through a real OS pty.
///
/// Reads happen on a blocking task (pty reads are not cancel-safe or
/// async-friendly) and are forwarded to the caller over an mpsc channel.
pub struct RealPtyAdapter {
    session: Mutex<Option<Session>>,
}

impl RealPtyAdapter {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(None),
        }
    }
}

impl Default for RealPtyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::PtyAdapter for RealPtyAdapter {
    async fn spawn(&self, spec: SpawnSpec) -> Result<mpsc::Receiver<PtyOutput>, PtyError> {
        {
            let mut guard = self.session.lock();
            if let Some(session) = guard.as_mut() {
                if matches!(session.child.try_wait(), Ok(None)) {
                    return Err(PtyError::AlreadyRunning);
                }
                // Previous child already exited; free the slot for reuse.
                *guard = None;
            }
        }

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: spec.rows,
                cols: spec.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;

        let mut cmd = CommandBuilder::new(&spec.cmd);
        cmd.args(&spec.args);
        if let Some(cwd) = &spec.cwd {
            cmd.cwd(cwd);
        }
        for (k, v) in &spec.env {
            cmd.env(k, v);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;
        drop(pair.slave);

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;

        let (tx, rx) = mpsc::channel(256);

        tokio::task::spawn_blocking(move || {
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                        if tx.blocking_send(PtyOutput::Chunk(chunk)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "pty read error");
                        break;
                    }
                }
            }
            debug!("pty reader task exiting");
            let _ = tx.blocking_send(PtyOutput::Exited {
                exit_code: None,
                signal: None,
            });
        });

        *self.session.lock() = Some(Session {
            master: pair.master,
            writer,
            child,
        });

        Ok(rx)
    }

    async fn write(&self, data: &[u8]) -> Result<(), PtyError> {
        let data = data.to_vec();
        let mut guard = self.session.lock();
        let session = guard.as_mut().ok_or(PtyError::NotRunning)?;
        session
            .writer
            .write_all(&data)
            .map_err(|e| PtyError::WriteFailed(e.to_string()))?;
        session
            .writer
            .flush()
            .map_err(|e| PtyError::WriteFailed(e.to_string()))
    }

    async fn resize(&self, cols: u16, rows: u16) -> Result<(), PtyError> {
        let guard = self.session.lock();
        let session = guard.as_ref().ok_or(PtyError::NotRunning)?;
        session
            .master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| PtyError::ResizeFailed(e.to_string()))
    }

    async fn kill(&self) -> Result<(), PtyError> {
        let mut guard = self.session.lock();
        if let Some(session) = guard.as_mut() {
            let _ = session.child.kill();
        }
        *guard = None;
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        let mut guard = self.session.lock();
        match guard.as_mut() {
            Some(session) => matches!(session.child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

