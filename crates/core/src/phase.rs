// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase definitions and phase-run bookkeeping (spec §4.5).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of one phase in the fixed research/planning/execution/integration
/// sequence. Left open (not an enum) so operators can define custom phase
/// sequences via configuration without a code change.
pub type PhaseName = String;

/// Static configuration for one phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub name: PhaseName,
    pub duration_minutes: u64,
    #[serde(default)]
    pub allowed_tools: HashSet<String>,
    #[serde(default)]
    pub forbidden_tools: HashSet<String>,
    /// Path or glob pattern; satisfied if at least one file matches.
    pub output_artifact: String,
    #[serde(default)]
    pub success_regex: Option<String>,
    /// Whether this phase fans out into independent parallel sub-tasks
    /// (spec §4.5 point 5 — only `execution` does this by default).
    #[serde(default)]
    pub parallel: bool,
}

/// A recorded violation of a phase's tool restrictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub tool: String,
    pub at_ms: u64,
}

/// Outcome of a single phase invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseOutcome {
    Success,
    Timeout,
    TaskFailed,
}

/// Record of one phase execution within a Phase Controller cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRun {
    pub phase_name: PhaseName,
    pub started_at_ms: u64,
    pub finished_at_ms: Option<u64>,
    pub outcome: Option<PhaseOutcome>,
    pub violations: Vec<Violation>,
    pub artifacts_found: Vec<String>,
}

impl PhaseRun {
    pub fn new(phase_name: PhaseName, started_at_ms: u64) -> Self {
        Self {
            phase_name,
            started_at_ms,
            finished_at_ms: None,
            outcome: None,
            violations: Vec::new(),
            artifacts_found: Vec::new(),
        }
    }
}

/// Overall result of a full phase-controller cycle (spec §4.5 "Failure semantics").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub runs: Vec<PhaseRun>,
    pub failed_phase: Option<PhaseName>,
    /// True when every phase ran to `Success` but a downstream phase still
    /// could not consume an upstream artifact (spec §4.5 "degraded").
    pub degraded: bool,
}

impl CycleReport {
    pub fn success(&self) -> bool {
        self.failed_phase.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_report_success_when_no_failed_phase() {
        let report = CycleReport {
            runs: vec![],
            failed_phase: None,
            degraded: false,
        };
        assert!(report.success());
    }

    #[test]
    fn cycle_report_not_success_with_failed_phase() {
        let report = CycleReport {
            runs: vec![],
            failed_phase: Some("research".to_string()),
            degraded: false,
        };
        assert!(!report.success());
    }

    #[test]
    fn phase_run_starts_with_no_outcome() {
        let run = PhaseRun::new("research".to_string(), 0);
        assert!(run.outcome.is_none());
        assert!(run.violations.is_empty());
    }
}
