// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule Set data schema (spec §3, §4.2). Loading and matching live in the
//! `warden-rules` crate; this module only defines the shape.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a rule (must be unique within a loaded Rule Set).
    pub struct RuleId;
}

/// Action severity of a rule match (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warn,
    Interrupt,
    Redirect,
}

impl Severity {
    /// Whether a match at this severity writes anything back to the child.
    pub fn intervenes(self) -> bool {
        matches!(self, Severity::Interrupt | Severity::Redirect)
    }
}

/// A named (regex, severity, action) triple evaluated against the tail of
/// the child's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    /// Regex source text; compiled once at load time by `warden-rules`.
    pub regex: String,
    pub severity: Severity,
    #[serde(default)]
    pub corrective_message: Option<String>,
    /// Restricts this rule to a named phase; `None` means "all phases".
    #[serde(default)]
    pub phase_scope: Option<crate::phase::PhaseName>,
    /// If true and severity is `Interrupt`, an unresponsive child is escalated
    /// from `ESC` to `Ctrl-C` after the grace period (spec §4.2).
    #[serde(default)]
    pub escalating: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_and_redirect_intervene() {
        assert!(Severity::Interrupt.intervenes());
        assert!(Severity::Redirect.intervenes());
        assert!(!Severity::Info.intervenes());
        assert!(!Severity::Warn.intervenes());
    }
}
