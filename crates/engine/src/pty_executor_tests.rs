// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use warden_adapters::FakePtyAdapter;
use warden_core::{TaskId, WorkerId};
use warden_rules::RuleSet;

fn test_ruleset() -> Arc<RuleSet> {
    Arc::new(
        RuleSet::parse(
            r#"
        [[rule]]
        id = "danger"
        regex = "danger"
        severity = "interrupt"
        corrective_message = "Stop that."
    "#,
        )
        .unwrap(),
    )
}

fn redirect_ruleset() -> Arc<RuleSet> {
    Arc::new(
        RuleSet::parse(
            r#"
        [[rule]]
        id = "planning"
        regex = "I would"
        severity = "redirect"
        corrective_message = "Stop planning. Create the file now."
    "#,
        )
        .unwrap(),
    )
}

fn fast_config() -> PtyExecutorConfig {
    PtyExecutorConfig {
        heartbeat_interval: Duration::from_secs(3600),
        stream_window_chars: 1000,
        stall_threshold: Duration::from_secs(3600),
        intervention_grace: Duration::from_millis(1),
        output_buffer_bytes: 1_000_000,
    }
}

#[tokio::test]
async fn emits_data_and_exit_events() {
    let adapter = Arc::new(FakePtyAdapter::new());
    let executor = PtyExecutor::new(Arc::clone(&adapter), fast_config());
    let (event_tx, mut event_rx) = mpsc::channel(32);
    let (spawn_tx, _spawn_rx) = mpsc::channel(8);

    executor
        .execute(
            SpawnSpec::new("agent"),
            TaskId::new("t1"),
            WorkerId::new("w1"),
            test_ruleset(),
            None,
            event_tx,
            spawn_tx,
        )
        .await
        .unwrap();

    adapter.push_output("hello world").await;
    adapter.push_exit(Some(0), None).await;

    let mut saw_data = false;
    let mut saw_exit = false;
    for _ in 0..4 {
        match tokio::time::timeout(Duration::from_secs(1), event_rx.recv())
            .await
            .unwrap()
        {
            Some(ev) => match ev.kind {
                EventKind::Data { chunk } => {
                    assert_eq!(chunk, "hello world");
                    saw_data = true;
                }
                EventKind::Exit { exit_code, .. } => {
                    assert_eq!(exit_code, Some(0));
                    saw_exit = true;
                    break;
                }
                _ => {}
            },
            None => break,
        }
    }
    assert!(saw_data);
    assert!(saw_exit);
    assert!(!executor.is_running());
}

#[tokio::test]
async fn second_execute_while_running_fails() {
    let adapter = Arc::new(FakePtyAdapter::new());
    let executor = PtyExecutor::new(Arc::clone(&adapter), fast_config());
    let (event_tx, _rx) = mpsc::channel(32);
    let (spawn_tx, _spawn_rx) = mpsc::channel(8);

    executor
        .execute(
            SpawnSpec::new("agent"),
            TaskId::new("t1"),
            WorkerId::new("w1"),
            test_ruleset(),
            None,
            event_tx.clone(),
            spawn_tx.clone(),
        )
        .await
        .unwrap();

    let err = executor
        .execute(
            SpawnSpec::new("agent"),
            TaskId::new("t1"),
            WorkerId::new("w1"),
            test_ruleset(),
            None,
            event_tx,
            spawn_tx,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PtyExecutorError::AlreadyRunning));
}

#[tokio::test]
async fn rule_match_triggers_intervention_write() {
    let adapter = Arc::new(FakePtyAdapter::new());
    let executor = PtyExecutor::new(Arc::clone(&adapter), fast_config());
    let (event_tx, mut event_rx) = mpsc::channel(32);
    let (spawn_tx, _spawn_rx) = mpsc::channel(8);

    executor
        .execute(
            SpawnSpec::new("agent"),
            TaskId::new("t1"),
            WorkerId::new("w1"),
            test_ruleset(),
            None,
            event_tx,
            spawn_tx,
        )
        .await
        .unwrap();

    adapter.push_output("there is danger ahead").await;

    let mut saw_detection = false;
    let mut saw_intervention = false;
    for _ in 0..6 {
        if let Ok(Some(ev)) = tokio::time::timeout(Duration::from_secs(1), event_rx.recv()).await {
            match ev.kind {
                EventKind::DetectionEvent { .. } => saw_detection = true,
                EventKind::Intervention { escalated, .. } => {
                    saw_intervention = true;
                    assert!(!escalated);
                }
                _ => {}
            }
            if saw_detection && saw_intervention {
                break;
            }
        }
    }
    assert!(saw_detection);
    assert!(saw_intervention);

    let calls = adapter.calls();
    assert!(calls
        .iter()
        .any(|c| matches!(c, warden_adapters::PtyCall::Write(b) if b == &[0x1Bu8])));
}

#[tokio::test]
async fn redirect_severity_writes_corrective_message_without_esc() {
    let adapter = Arc::new(FakePtyAdapter::new());
    let executor = PtyExecutor::new(Arc::clone(&adapter), fast_config());
    let (event_tx, mut event_rx) = mpsc::channel(32);
    let (spawn_tx, _spawn_rx) = mpsc::channel(8);

    executor
        .execute(
            SpawnSpec::new("agent"),
            TaskId::new("t1"),
            WorkerId::new("w1"),
            redirect_ruleset(),
            None,
            event_tx,
            spawn_tx,
        )
        .await
        .unwrap();

    adapter.push_output("I would start by reading the file").await;

    let mut saw_intervention = false;
    for _ in 0..6 {
        if let Ok(Some(ev)) = tokio::time::timeout(Duration::from_secs(1), event_rx.recv()).await {
            if let EventKind::Intervention { text, escalated, .. } = ev.kind {
                saw_intervention = true;
                assert_eq!(text, "Stop planning. Create the file now.");
                assert!(!escalated);
                break;
            }
        }
    }
    assert!(saw_intervention);

    let calls = adapter.calls();
    assert!(!calls
        .iter()
        .any(|c| matches!(c, warden_adapters::PtyCall::Write(b) if b == &[0x1Bu8])));
    assert!(calls
        .iter()
        .any(|c| matches!(c, warden_adapters::PtyCall::Write(b) if b == b"Stop planning. Create the file now.\n")));
}

#[tokio::test]
async fn kill_is_idempotent_when_not_running() {
    let adapter = Arc::new(FakePtyAdapter::new());
    let executor = PtyExecutor::new(adapter, fast_config());
    executor.kill().await.unwrap();
    executor.kill().await.unwrap();
}
