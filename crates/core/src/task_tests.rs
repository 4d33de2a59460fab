// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn queued_to_assigned_is_allowed() {
    assert!(TaskState::Queued.can_transition_to(TaskState::Assigned));
}

#[test]
fn no_skipping_assigned_to_verifying() {
    assert!(!TaskState::Assigned.can_transition_to(TaskState::Verifying));
}

#[test]
fn running_can_requeue_on_worker_death() {
    assert!(TaskState::Running.can_transition_to(TaskState::Queued));
}

#[test]
fn any_state_can_fail_except_terminal() {
    assert!(TaskState::Queued.can_transition_to(TaskState::Failed));
    assert!(TaskState::Running.can_transition_to(TaskState::Failed));
    assert!(TaskState::Verifying.can_transition_to(TaskState::Failed));
}

#[test]
fn terminal_states_have_no_outgoing_edges() {
    assert!(!TaskState::Complete.can_transition_to(TaskState::Failed));
    assert!(!TaskState::Failed.can_transition_to(TaskState::Queued));
    assert!(TaskState::Complete.is_terminal());
    assert!(TaskState::Failed.is_terminal());
}

#[test]
fn verifying_cannot_regress_to_running() {
    assert!(!TaskState::Verifying.can_transition_to(TaskState::Running));
}

#[test]
fn acceptance_criteria_empty_when_no_checks_configured() {
    let criteria = AcceptanceCriteria::default();
    assert!(criteria.is_empty());
}

#[test]
fn acceptance_criteria_not_empty_with_files_expected() {
    let mut criteria = AcceptanceCriteria::default();
    criteria.files_expected.insert(PathBuf::from("hello.py"));
    assert!(!criteria.is_empty());
}

#[test]
fn acceptance_report_passes_with_no_failures() {
    let report = AcceptanceReport::default();
    assert!(report.passed());
}

#[test]
fn acceptance_report_fails_with_any_failure() {
    let report = AcceptanceReport {
        failures: vec![AcceptanceFailure::MissingFile {
            path: PathBuf::from("x"),
        }],
    };
    assert!(!report.passed());
}

#[test]
fn task_new_starts_queued_with_no_result() {
    let task = Task::new(
        TaskId::new("t-1"),
        "create hello.py".to_string(),
        SubmitOptions::default(),
        1000,
    );
    assert_eq!(task.state, TaskState::Queued);
    assert!(task.result.is_none());
    assert_eq!(task.attempt, 0);
    assert_eq!(task.created_at_ms, 1000);
}

#[test]
fn task_serde_roundtrip() {
    let task = Task::new(
        TaskId::new("t-2"),
        "prompt".to_string(),
        SubmitOptions {
            priority: 5,
            ..Default::default()
        },
        0,
    );
    let json = serde_json::to_string(&task).unwrap();
    let back: Task = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, task.id);
    assert_eq!(back.priority, 5);
}
