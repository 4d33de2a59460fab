// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured in-band signals (`TOOL_INVOCATION:`/`SPAWN_CHILD:`) embedded
//! in a child's stdout (spec §4.2). A minimal balanced-brace scanner,
//! tolerant of whitespace between the prefix and the opening brace;
//! malformed JSON is logged and ignored rather than failing the stream.

use serde_json::Value;
use tracing::warn;

const TOOL_PREFIX: &str = "TOOL_INVOCATION:";
const SPAWN_PREFIX: &str = "SPAWN_CHILD:";

/// Bound on how much unconsumed, unbalanced text we'll hold waiting for a
/// closing brace before giving up on it as malformed.
const MAX_PENDING_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone)]
pub enum StructuredSignal {
    ToolInvocation { payload: Value },
    SpawnChild { prompt: String, acceptance: Value },
}

/// Incremental scanner over a growing stream of text. Feed it chunks in
/// arrival order; it returns any complete signals found so far and retains
/// partial matches across calls.
pub struct SignalScanner {
    buffer: String,
    scanned: usize,
}

impl SignalScanner {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            scanned: 0,
        }
    }

    pub fn feed(&mut self, chunk: &str) -> Vec<StructuredSignal> {
        self.buffer.push_str(chunk);
        let mut out = Vec::new();

        loop {
            let rest = &self.buffer[self.scanned..];
            let tool_pos = rest.find(TOOL_PREFIX).map(|p| (p, TOOL_PREFIX));
            let spawn_pos = rest.find(SPAWN_PREFIX).map(|p| (p, SPAWN_PREFIX));
            let next = match (tool_pos, spawn_pos) {
                (Some(t), Some(s)) => Some(if t.0 <= s.0 { t } else { s }),
                (Some(t), None) => Some(t),
                (None, Some(s)) => Some(s),
                (None, None) => None,
            };

            let Some((rel_pos, prefix)) = next else {
                break;
            };

            let prefix_end = self.scanned + rel_pos + prefix.len();
            let after_prefix = &self.buffer[prefix_end..];
            let brace_rel = after_prefix.find(|c: char| !c.is_whitespace());

            match brace_rel {
                None => break, // only whitespace so far; wait for more
                Some(brace_rel) if after_prefix.as_bytes()[brace_rel] != b'{' => {
                    // Not JSON at all; skip past the prefix and keep scanning.
                    warn!(prefix, "structured signal prefix not followed by JSON object");
                    self.scanned = prefix_end;
                }
                Some(brace_rel) => {
                    let obj_start = prefix_end + brace_rel;
                    match find_balanced_object(&self.buffer, obj_start) {
                        None => break, // incomplete; wait for more data
                        Some(obj_end) => {
                            let json_text = &self.buffer[obj_start..obj_end];
                            self.scanned = obj_end;
                            match parse_signal(prefix, json_text) {
                                Some(signal) => out.push(signal),
                                None => warn!(prefix, "malformed structured signal JSON, ignored"),
                            }
                        }
                    }
                }
            }
        }

        self.compact();
        out
    }

    fn compact(&mut self) {
        if self.scanned > 0 {
            self.buffer.drain(..self.scanned);
            self.scanned = 0;
        }
        if self.buffer.len() > MAX_PENDING_BYTES {
            warn!(
                pending_bytes = self.buffer.len(),
                "structured signal never closed within bound, discarding"
            );
            self.buffer.clear();
        }
    }
}

impl Default for SignalScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_signal(prefix: &str, json_text: &str) -> Option<StructuredSignal> {
    let value: Value = serde_json::from_str(json_text).ok()?;
    if prefix == TOOL_PREFIX {
        Some(StructuredSignal::ToolInvocation { payload: value })
    } else {
        let prompt = value.get("prompt")?.as_str()?.to_string();
        let acceptance = value.get("acceptance").cloned().unwrap_or(Value::Null);
        Some(StructuredSignal::SpawnChild { prompt, acceptance })
    }
}

/// `haystack[start]` must be `'{'`. Returns the exclusive end index of the
/// matching closing brace, respecting JSON string quoting and escapes, or
/// `None` if the object isn't balanced within the haystack yet.
fn find_balanced_object(haystack: &str, start: usize) -> Option<usize> {
    let bytes = haystack.as_bytes();
    debug_assert_eq!(bytes.get(start), Some(&b'{'));

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = start;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else {
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
