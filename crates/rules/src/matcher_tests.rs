// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ruleset::RuleSet;

fn ruleset(toml: &str) -> Arc<RuleSet> {
    Arc::new(RuleSet::parse(toml).unwrap())
}

#[test]
fn matches_within_a_single_chunk() {
    let rs = ruleset(
        r#"
        [[rule]]
        id = "rm-rf"
        regex = "rm -rf"
        severity = "interrupt"
    "#,
    );
    let mut matcher = StreamMatcher::new(rs, 1000);
    let matches = matcher.feed("about to run rm -rf / now", None);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].rule_id.as_str(), "rm-rf");
}

#[test]
fn does_not_report_the_same_match_twice_across_reads() {
    let rs = ruleset(
        r#"
        [[rule]]
        id = "danger"
        regex = "danger"
        severity = "warn"
    "#,
    );
    let mut matcher = StreamMatcher::new(rs, 1000);
    let first = matcher.feed("this is danger", None);
    assert_eq!(first.len(), 1);
    // second feed still contains "danger" in the retained window/overlap
    let second = matcher.feed(" zone ahead", None);
    assert!(second.is_empty());
}

#[test]
fn catches_match_straddling_a_read_boundary() {
    let rs = ruleset(
        r#"
        [[rule]]
        id = "split"
        regex = "dangerous"
        severity = "warn"
    "#,
    );
    let mut matcher = StreamMatcher::new(rs, 1000);
    let first = matcher.feed("this is dan", None);
    assert!(first.is_empty());
    let second = matcher.feed("gerous territory", None);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].matched_text, "dangerous");
}

#[test]
fn phase_scope_filters_matches() {
    let scoped_toml = r#"
        [[rule]]
        id = "scoped"
        regex = "forbidden"
        severity = "interrupt"
        phase_scope = "research"
    "#;

    let mut wrong = StreamMatcher::new(ruleset(scoped_toml), 1000);
    assert!(wrong.feed("this is forbidden", Some("execution")).is_empty());

    let mut right = StreamMatcher::new(ruleset(scoped_toml), 1000);
    assert_eq!(right.feed("this is forbidden", Some("research")).len(), 1);
}

#[test]
fn unscoped_rule_matches_in_any_phase() {
    let rs = ruleset(
        r#"
        [[rule]]
        id = "global"
        regex = "always"
        severity = "info"
    "#,
    );
    let mut matcher = StreamMatcher::new(rs, 1000);
    let matches = matcher.feed("always watching", Some("planning"));
    assert_eq!(matches.len(), 1);
}

#[test]
fn evaluates_rules_in_declared_order() {
    let rs = ruleset(
        r#"
        [[rule]]
        id = "first"
        regex = "x"
        severity = "info"

        [[rule]]
        id = "second"
        regex = "x"
        severity = "warn"
    "#,
    );
    let mut matcher = StreamMatcher::new(rs, 1000);
    let matches = matcher.feed("x", None);
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].rule_id.as_str(), "first");
    assert_eq!(matches[1].rule_id.as_str(), "second");
}

#[test]
fn window_snapshot_reflects_retained_tail() {
    let rs = ruleset(
        r#"
        [[rule]]
        id = "r"
        regex = "x"
        severity = "info"
    "#,
    );
    let mut matcher = StreamMatcher::new(rs, 10);
    matcher.feed(&"a".repeat(50), None);
    assert!(matcher.window_snapshot().len() < 50);
}
