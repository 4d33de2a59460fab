// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_minimal_document() {
    let toml = r#"
        [[rule]]
        id = "no-rm-rf"
        regex = "rm -rf"
        severity = "interrupt"
        corrective_message = "Stop. That command is forbidden."
    "#;
    let set = RuleSet::parse(toml).unwrap();
    assert_eq!(set.len(), 1);
    let rule = set.rules().next().unwrap();
    assert_eq!(rule.id.as_str(), "no-rm-rf");
    assert_eq!(rule.severity, Severity::Interrupt);
}

#[test]
fn rejects_duplicate_ids() {
    let toml = r#"
        [[rule]]
        id = "dup"
        regex = "a"
        severity = "info"

        [[rule]]
        id = "dup"
        regex = "b"
        severity = "info"
    "#;
    let err = RuleSet::parse(toml).unwrap_err();
    assert!(matches!(err, RuleError::DuplicateId(id) if id == "dup"));
}

#[test]
fn rejects_invalid_regex() {
    let toml = r#"
        [[rule]]
        id = "bad"
        regex = "("
        severity = "info"
    "#;
    let err = RuleSet::parse(toml).unwrap_err();
    assert!(matches!(err, RuleError::InvalidRegex { id, .. } if id == "bad"));
}

#[test]
fn rejects_empty_document() {
    let err = RuleSet::parse("").unwrap_err();
    assert!(matches!(err, RuleError::Empty));
}

#[test]
fn preserves_declared_order() {
    let toml = r#"
        [[rule]]
        id = "first"
        regex = "a"
        severity = "info"

        [[rule]]
        id = "second"
        regex = "b"
        severity = "warn"
    "#;
    let set = RuleSet::parse(toml).unwrap();
    let ids: Vec<_> = set.rules().map(|r| r.id.as_str().to_string()).collect();
    assert_eq!(ids, vec!["first", "second"]);
}

#[test]
fn phase_scope_and_escalating_round_trip() {
    let toml = r#"
        [[rule]]
        id = "scoped"
        regex = "x"
        severity = "interrupt"
        phase_scope = "execution"
        escalating = true
    "#;
    let set = RuleSet::parse(toml).unwrap();
    let rule = set.rules().next().unwrap();
    assert_eq!(rule.phase_scope.as_deref(), Some("execution"));
    assert!(rule.escalating);
}
