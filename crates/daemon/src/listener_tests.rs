// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;
use warden_adapters::FakePtyAdapter;
use warden_core::FakeClock;
use warden_engine::SupervisorConfig;
use warden_rules::RuleSet;

fn empty_ruleset() -> Arc<RuleSet> {
    Arc::new(
        RuleSet::parse(
            r#"
        [[rule]]
        id = "unused"
        regex = "this-pattern-never-appears-in-these-tests"
        severity = "info"
    "#,
        )
        .unwrap(),
    )
}

fn harness(root: &std::path::Path) -> (Arc<ListenCtx>, mpsc::Receiver<Event>) {
    let adapter = Arc::new(FakePtyAdapter::new());
    let (event_tx, event_rx) = mpsc::channel(1024);
    let root_str = root.to_string_lossy().into_owned();
    let spawn_spec_fn: warden_engine::SpawnSpecFn = Arc::new(move |task| {
        let mut spec = warden_adapters::SpawnSpec::new(task.prompt.clone());
        spec.cwd = Some(root_str.clone());
        spec
    });
    let supervisor = warden_engine::spawn(
        vec![adapter],
        empty_ruleset(),
        spawn_spec_fn,
        std::collections::HashMap::new(),
        SupervisorConfig::default(),
        FakeClock::new(),
        event_tx,
    );
    let ctx = Arc::new(ListenCtx {
        supervisor,
        events: broadcast::channel(256).0,
        phases: vec![],
        root: root.to_path_buf(),
        start_time: Instant::now(),
        shutdown: Arc::new(Notify::new()),
    });
    (ctx, event_rx)
}

/// Bridge the Supervisor's single `mpsc::Receiver<Event>` into the ctx's
/// broadcast fan-out, the way `main.rs`'s real event-loop task does.
fn spawn_fanout(ctx: Arc<ListenCtx>, mut event_rx: mpsc::Receiver<Event>) {
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let _ = ctx.events.send(event);
        }
    });
}

#[tokio::test]
async fn ping_returns_pong() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _rx) = harness(dir.path());
    let response = handle_request(Request::Ping, &ctx).await;
    assert!(matches!(response, Response::Pong));
}

#[tokio::test]
async fn submit_then_status_reflects_queued_task() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _rx) = harness(dir.path());
    let response = handle_request(
        Request::Submit {
            prompt: "do work".to_string(),
            priority: 0,
            acceptance: AcceptanceCriteria::default(),
            phase_scope: None,
        },
        &ctx,
    )
    .await;
    assert!(matches!(response, Response::Submitted { .. }));

    let status = handle_request(Request::Status, &ctx).await;
    match status {
        Response::Status { snapshot } => assert_eq!(snapshot.queued + snapshot.assigned + snapshot.running, 1),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn submit_rejects_empty_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _rx) = harness(dir.path());
    let response = handle_request(
        Request::Submit { prompt: String::new(), priority: 0, acceptance: AcceptanceCriteria::default(), phase_scope: None },
        &ctx,
    )
    .await;
    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn intervene_on_unknown_task_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _rx) = harness(dir.path());
    let response = handle_request(
        Request::Intervene { task_id: "does-not-exist".to_string(), text: "stop".to_string() },
        &ctx,
    )
    .await;
    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn approve_reports_no_pending_gate() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _rx) = harness(dir.path());
    let response = handle_request(Request::Approve { task_id: "t1".to_string() }, &ctx).await;
    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn subscribe_filters_by_task_id() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, event_rx) = harness(dir.path());
    spawn_fanout(Arc::clone(&ctx), event_rx);

    let wanted = TaskId::new("task-a");
    let other = TaskId::new("task-b");
    let mut sub = ctx.events.subscribe();
    ctx.events
        .send(Event::new(0, Some(other), None, warden_core::EventKind::Heartbeat))
        .unwrap();
    ctx.events
        .send(Event::new(1, Some(wanted.clone()), None, warden_core::EventKind::Heartbeat))
        .unwrap();

    let mut seen = None;
    for _ in 0..2 {
        let event = sub.recv().await.unwrap();
        if event.task_id.as_ref() == Some(&wanted) {
            seen = Some(event);
            break;
        }
    }
    assert!(seen.is_some());
}

#[tokio::test]
async fn run_cycle_reports_failed_phase_on_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx_base, event_rx) = harness(dir.path());
    let phase = PhaseConfig {
        name: "research".to_string(),
        duration_minutes: 0,
        allowed_tools: Default::default(),
        forbidden_tools: Default::default(),
        output_artifact: "never-appears.md".to_string(),
        success_regex: None,
        parallel: false,
    };
    let ctx = Arc::new(ListenCtx {
        supervisor: ctx_base.supervisor.clone(),
        events: ctx_base.events.clone(),
        phases: vec![phase],
        root: dir.path().to_path_buf(),
        start_time: ctx_base.start_time,
        shutdown: Arc::clone(&ctx_base.shutdown),
    });
    spawn_fanout(Arc::clone(&ctx), event_rx);

    let response = run_cycle(&ctx, "go".to_string()).await;
    match response {
        Response::CycleResult { report } => assert_eq!(report.failed_phase, Some("research".to_string())),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn shutdown_notifies_waiters() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _rx) = harness(dir.path());
    let notified = Arc::clone(&ctx.shutdown);
    let waiter = tokio::spawn(async move { notified.notified().await });

    let response = handle_request(Request::Shutdown { kill: false }, &ctx).await;
    assert!(matches!(response, Response::ShuttingDown));
    waiter.await.unwrap();
}
