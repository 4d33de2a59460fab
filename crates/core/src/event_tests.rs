// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::task::TaskId;

#[test]
fn task_update_serializes_with_type_tag() {
    let event = Event::new(
        1000,
        Some(TaskId::new("t-1")),
        None,
        EventKind::TaskUpdate {
            from: TaskState::Queued,
            to: TaskState::Assigned,
            reason: None,
        },
    );
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "task:update");
    assert_eq!(json["task_id"], "t-1");
    assert_eq!(json["from"], "queued");
    assert_eq!(json["to"], "assigned");
}

#[test]
fn event_roundtrips_through_json() {
    let event = Event::new(
        42,
        Some(TaskId::new("t-2")),
        Some(WorkerId::new("w-1")),
        EventKind::Exit {
            exit_code: Some(0),
            signal: None,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(back.timestamp_ms, 42);
    match back.kind {
        EventKind::Exit { exit_code, .. } => assert_eq!(exit_code, Some(0)),
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[test]
fn unknown_type_tag_deserializes_to_custom() {
    let json = r#"{"timestamp_ms":1,"task_id":null,"worker_id":null,"type":"future:event","foo":"bar"}"#;
    let event: Event = serde_json::from_str(json).unwrap();
    assert!(matches!(event.kind, EventKind::Custom));
}

#[test]
fn heartbeat_has_no_extra_fields() {
    let event = Event::new(0, None, None, EventKind::Heartbeat);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "stream:heartbeat");
}
