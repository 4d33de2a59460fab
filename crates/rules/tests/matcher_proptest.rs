// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property: a fixed literal pattern is found exactly once regardless of
//! where the surrounding text is split into PTY-read-sized chunks.

use proptest::prelude::*;
use std::sync::Arc;
use warden_rules::{RuleSet, StreamMatcher};

const PATTERN_TEXT: &str = "SECRET_TOKEN_XYZ";

fn rule_set() -> Arc<RuleSet> {
    let toml = format!(
        r#"
        [[rule]]
        id = "needle"
        regex = "{PATTERN_TEXT}"
        severity = "warn"
    "#
    );
    Arc::new(RuleSet::parse(&toml).unwrap())
}

/// Split `text` at the given cut points (sorted, deduped, clamped to
/// `text`'s char boundaries) into a sequence of chunks.
fn split_at(text: &str, mut cuts: Vec<usize>) -> Vec<String> {
    cuts.sort_unstable();
    cuts.dedup();
    cuts.retain(|&c| c > 0 && c < text.len());

    let mut chunks = Vec::new();
    let mut prev = 0;
    for c in cuts {
        if text.is_char_boundary(c) {
            chunks.push(text[prev..c].to_string());
            prev = c;
        }
    }
    chunks.push(text[prev..].to_string());
    chunks
}

proptest! {
    #[test]
    fn finds_needle_exactly_once_under_any_chunking(
        prefix_len in 0usize..200,
        suffix_len in 0usize..200,
        cuts in prop::collection::vec(0usize..400, 0..12),
    ) {
        let text = format!(
            "{}{}{}",
            "x".repeat(prefix_len),
            PATTERN_TEXT,
            "y".repeat(suffix_len),
        );
        let chunks = split_at(&text, cuts);

        let mut matcher = StreamMatcher::new(rule_set(), 64);
        let mut total = 0;
        for chunk in &chunks {
            total += matcher.feed(chunk, None).len();
        }
        prop_assert_eq!(total, 1);
    }
}
