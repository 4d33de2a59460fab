// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deceptive-claim pattern scanner (spec §7 `DeceptiveClaim`): flags a
//! child's captured output for unverifiable self-congratulatory completion
//! claims, used as an acceptance-check input in `warden-engine`. The
//! pattern list is a concrete, overridable default, not the final word on
//! content (spec §9 open questions).

use regex::RegexSet;
use std::sync::OnceLock;

/// Default patterns flagging claims of completion/correctness that carry
/// no verifiable evidence in the surrounding text.
pub const DEFAULT_DECEPTIVE_PATTERNS: &[&str] = &[
    r"(?i)all tests pass(ed)?",
    r"(?i)i(?:'ve| have) successfully (?:completed|implemented|fixed)",
    r"(?i)(?:the )?implementation is (?:complete|finished|done) and (?:fully )?tested",
    r"(?i)everything (?:is|works) working (?:correctly|as expected)",
    r"(?i)no (?:further )?(?:issues|errors|bugs) (?:remain|found|detected)",
    r"(?i)(?:this|the) (?:code|fix|change) is production[- ]ready",
];

fn default_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        RegexSet::new(DEFAULT_DECEPTIVE_PATTERNS).expect("default deceptive patterns must compile")
    })
}

/// One matched deceptive-claim phrase, with the default pattern's index
/// and the literal text it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeceptiveClaim {
    pub pattern_index: usize,
    pub matched_text: String,
}

/// Scan captured child output against the default deceptive-claim
/// patterns. Returns every match, in pattern-declaration order.
pub fn scan_deceptive_claims(text: &str) -> Vec<DeceptiveClaim> {
    scan_with_patterns(text, DEFAULT_DECEPTIVE_PATTERNS, default_set())
}

fn scan_with_patterns(text: &str, patterns: &[&str], set: &RegexSet) -> Vec<DeceptiveClaim> {
    let mut claims = Vec::new();
    for idx in set.matches(text).iter() {
        let re = regex::Regex::new(patterns[idx]).expect("pattern already validated by RegexSet");
        if let Some(m) = re.find(text) {
            claims.push(DeceptiveClaim {
                pattern_index: idx,
                matched_text: m.as_str().to_string(),
            });
        }
    }
    claims
}

#[cfg(test)]
#[path = "deceptive_tests.rs"]
mod tests;
