// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tail-window stream matcher (spec §4.2): matches the Rule Set against a
//! bounded trailing slice of a child's output, retaining enough overlap
//! between reads that a match straddling a PTY read boundary is never
//! missed, while never re-reporting the same match twice.

use crate::ruleset::RuleSet;
use std::sync::Arc;
use warden_core::{RuleId, Severity};

/// One rule match surfaced by the stream matcher. Carries everything the
/// caller needs to build a `Detection` and, if the severity intervenes,
/// decide what to write back to the child.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule_id: RuleId,
    pub severity: Severity,
    pub corrective_message: Option<String>,
    pub escalating: bool,
    pub matched_text: String,
}

/// Stateful matcher bound to one PTY session's output stream.
pub struct StreamMatcher {
    ruleset: Arc<RuleSet>,
    window_chars: usize,
    buffer: String,
    /// Global offset (in bytes fed so far) of `buffer[0]`.
    buffer_start: usize,
    /// Per-rule global offset up to which a match has already been
    /// reported, indexed the same as `ruleset.rules`.
    last_reported_end: Vec<usize>,
}

impl StreamMatcher {
    pub fn new(ruleset: Arc<RuleSet>, window_chars: usize) -> Self {
        let n = ruleset.len();
        Self {
            ruleset,
            window_chars,
            buffer: String::new(),
            buffer_start: 0,
            last_reported_end: vec![0; n],
        }
    }

    /// Returns a read-only snapshot of the retained tail window, for
    /// attaching to a `Detection` as `window_snapshot`.
    pub fn window_snapshot(&self) -> &str {
        &self.buffer
    }

    /// Feed the next chunk of output. `phase` restricts matches to rules
    /// whose `phase_scope` is unset or equal to it.
    pub fn feed(&mut self, chunk: &str, phase: Option<&str>) -> Vec<RuleMatch> {
        self.buffer.push_str(chunk);

        let retain = self.window_chars + self.ruleset.max_pattern_len;
        if self.buffer.len() > retain {
            let drop_bytes = self.buffer.len() - retain;
            let drop_bytes = floor_char_boundary(&self.buffer, drop_bytes);
            self.buffer.drain(..drop_bytes);
            self.buffer_start += drop_bytes;
        }

        let mut matches = Vec::new();
        for (idx, compiled) in self.ruleset.rules.iter().enumerate() {
            if let Some(scope) = compiled.rule.phase_scope.as_deref() {
                if Some(scope) != phase {
                    continue;
                }
            }
            for m in compiled.regex.find_iter(&self.buffer) {
                let global_start = self.buffer_start + m.start();
                let global_end = self.buffer_start + m.end();
                if global_start < self.last_reported_end[idx] {
                    continue;
                }
                self.last_reported_end[idx] = global_end;
                matches.push(RuleMatch {
                    rule_id: compiled.rule.id.clone(),
                    severity: compiled.rule.severity,
                    corrective_message: compiled.rule.corrective_message.clone(),
                    escalating: compiled.rule.escalating,
                    matched_text: m.as_str().to_string(),
                });
            }
        }
        matches
    }
}

fn floor_char_boundary(s: &str, idx: usize) -> usize {
    let mut i = idx.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
