// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::{BufRead, BufReader};
use tempfile::tempdir;
use warden_core::{Event, EventKind};

fn sample_event(n: u64) -> Event {
    Event::new(n, None, None, EventKind::Heartbeat)
}

fn read_lines(path: &Path) -> Vec<String> {
    let file = File::open(path).unwrap();
    BufReader::new(file)
        .lines()
        .map(|l| l.unwrap())
        .collect()
}

#[test]
fn appended_events_are_readable_after_flush() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let mut log = EventLog::open(&path, 1024 * 1024).unwrap();

    log.append(&sample_event(1)).unwrap();
    log.append(&sample_event(2)).unwrap();
    log.flush().unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    let parsed: Event = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(parsed.timestamp_ms, 1);
}

#[test]
fn threshold_triggers_automatic_flush() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let mut log = EventLog::open(&path, 1024 * 1024).unwrap();
    log.flush_threshold = 3;

    for i in 0..3 {
        log.append(&sample_event(i)).unwrap();
    }

    // No explicit flush() call; threshold should have already flushed.
    let lines = read_lines(&path);
    assert_eq!(lines.len(), 3);
}

#[test]
fn rotation_preserves_all_flushed_events_and_starts_fresh_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let mut log = EventLog::open(&path, 10).unwrap(); // tiny max_bytes forces rotation

    log.append(&sample_event(1)).unwrap();
    log.flush().unwrap();

    // original path now holds a fresh (empty) file after rotation
    assert!(path.exists());
    let fresh_lines = read_lines(&path);
    assert!(fresh_lines.is_empty());

    // exactly one rotated sibling file exists, holding the original event
    let rotated: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p != &path)
        .collect();
    assert_eq!(rotated.len(), 1);
    let rotated_lines = read_lines(&rotated[0]);
    assert_eq!(rotated_lines.len(), 1);
}

#[test]
fn reopening_an_existing_log_continues_tracking_its_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    {
        let mut log = EventLog::open(&path, 1024 * 1024).unwrap();
        log.append(&sample_event(1)).unwrap();
        log.flush().unwrap();
    }
    let existing_size = std::fs::metadata(&path).unwrap().len();

    let log = EventLog::open(&path, 1024 * 1024).unwrap();
    assert_eq!(log.bytes_since_rotation, existing_size);
}

#[test]
fn drop_flushes_pending_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    {
        let mut log = EventLog::open(&path, 1024 * 1024).unwrap();
        log.append(&sample_event(1)).unwrap();
        // dropped without explicit flush()
    }
    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
}
