// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL Event Log (spec §2/§6): one JSON object per line,
//! group-committed in small batches, with size-based rotation.
//!
//! This is an observer-only data artifact, not a recovery journal (unlike
//! the reference codebase's WAL, it carries no replay/snapshot machinery —
//! there is nothing here to replay into: task state lives in memory and is
//! rebuilt from a fresh `submit` on restart, per spec §9).

use crate::error::StorageError;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use chrono::Utc;
use tracing::{info, warn};
use warden_core::Event;

/// Flush interval for group commit.
const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// Maximum buffered lines before a flush is forced regardless of interval.
const DEFAULT_FLUSH_THRESHOLD: usize = 100;

/// Durable, append-only sink for `Event`s. Not safe to share across
/// threads directly — callers serialize access the same way the
/// reference codebase's WAL is owned by a single writer task.
pub struct EventLog {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes_since_rotation: u64,
    max_bytes: u64,
    pending_lines: usize,
    last_flush: Instant,
    flush_interval: Duration,
    flush_threshold: usize,
}

impl EventLog {
    pub fn open(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let bytes_since_rotation = file.metadata()?.len();

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            bytes_since_rotation,
            max_bytes,
            pending_lines: 0,
            last_flush: Instant::now(),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        })
    }

    /// Append one event. Non-blocking for the producer in spirit (the
    /// actual write is buffered and only hits disk on `flush`/threshold).
    pub fn append(&mut self, event: &Event) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.bytes_since_rotation += line.len() as u64;
        self.writer.write_all(&line)?;
        self.pending_lines += 1;

        if self.needs_flush() {
            self.flush()?;
        }
        Ok(())
    }

    pub fn needs_flush(&self) -> bool {
        self.pending_lines >= self.flush_threshold
            || self.last_flush.elapsed() >= self.flush_interval
    }

    /// Flush buffered writes to disk, then rotate if the size threshold
    /// was crossed. Rotation never drops the events just flushed: the
    /// current file is fully written and closed before the fresh one is
    /// opened.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.writer.flush()?;
        self.pending_lines = 0;
        self.last_flush = Instant::now();

        if self.bytes_since_rotation >= self.max_bytes {
            self.rotate()?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> Result<(), StorageError> {
        self.writer.flush()?;
        let suffix = Utc::now().format("%Y%m%d-%H%M%S%.3f").to_string();
        let rotated = rotated_path(&self.path, &suffix);
        std::fs::rename(&self.path, &rotated)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.writer = BufWriter::new(file);
        self.bytes_since_rotation = 0;
        info!(path = %self.path.display(), rotated = %rotated.display(), "event log rotated");
        Ok(())
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            warn!(error = %err, "failed to flush event log on drop");
        }
    }
}

fn rotated_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "events.jsonl".to_string());
    name.push('.');
    name.push_str(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "event_log_tests.rs"]
mod tests;
