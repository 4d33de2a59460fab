// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Acceptance verification (spec §3.1/§4.1/§7): pure functions over a
//! captured output string and a filesystem root, independent of the PTY
//! itself so they're unit-testable without spawning anything.

use std::collections::HashMap;
use std::path::Path;
use warden_core::{AcceptanceCriteria, AcceptanceFailure, AcceptanceReport};
use warden_rules::scan_deceptive_claims;

/// Minimum file size (bytes) for a `files_expected` entry to count as
/// present (spec §6 `acceptance_min_file_bytes`, default 50).
pub const DEFAULT_MIN_FILE_BYTES: u64 = 50;

/// A custom predicate, resolved by name and run against the captured
/// output. The spec treats these as "opaque functions" (§4.1); callers
/// register implementations by name.
pub type CustomPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Evaluate a task's acceptance criteria once its child has exited.
///
/// `exit_code` is the child's exit status (acceptance only runs when the
/// controller considers the run a candidate pass — a nonzero exit is
/// reported by the caller as `ExitCode` failure, separate from this
/// struct-level check, per spec §4.1's state diagram).
pub fn verify(
    criteria: &AcceptanceCriteria,
    root: &Path,
    captured_output: &str,
    test_invocation_observed: bool,
    test_invocation_exit_code: Option<i32>,
    custom_predicates: &HashMap<String, CustomPredicate>,
    min_file_bytes: u64,
) -> AcceptanceReport {
    let mut failures = Vec::new();

    for path in &criteria.files_expected {
        match check_file(root, path, min_file_bytes) {
            Ok(()) => {}
            Err(failure) => failures.push(failure),
        }
    }

    if criteria.tests_required {
        if !test_invocation_observed {
            failures.push(AcceptanceFailure::NoTestInvocationObserved);
        } else if criteria.tests_must_pass {
            if let Some(code) = test_invocation_exit_code {
                if code != 0 {
                    failures.push(AcceptanceFailure::TestsFailed { exit_code: code });
                }
            } else {
                failures.push(AcceptanceFailure::TestsFailed { exit_code: -1 });
            }
        }
    }

    for name in &criteria.custom_predicates {
        let passed = custom_predicates
            .get(name)
            .map(|f| f(captured_output))
            .unwrap_or(false);
        if !passed {
            failures.push(AcceptanceFailure::CustomPredicateFailed { name: name.clone() });
        }
    }

    let has_missing_expected_file = !criteria.files_expected.is_empty()
        && failures.iter().any(|f| matches!(f, AcceptanceFailure::MissingFile { .. }));
    if has_missing_expected_file {
        for claim in scan_deceptive_claims(captured_output) {
            failures.push(AcceptanceFailure::DeceptiveClaim {
                pattern: claim.matched_text,
            });
        }
    }

    AcceptanceReport { failures }
}

fn check_file(root: &Path, rel_path: &Path, min_bytes: u64) -> Result<(), AcceptanceFailure> {
    let full = root.join(rel_path);
    let metadata = std::fs::metadata(&full).map_err(|_| AcceptanceFailure::MissingFile {
        path: rel_path.to_path_buf(),
    })?;
    if metadata.len() < min_bytes {
        return Err(AcceptanceFailure::FileTooSmall {
            path: rel_path.to_path_buf(),
            bytes: metadata.len(),
        });
    }
    Ok(())
}

/// Whether at least one path matching `glob_pattern` (relative to `root`)
/// exists, used by the Phase Controller's artifact gate (spec §4.5).
pub fn artifact_satisfied(root: &Path, glob_pattern: &str) -> bool {
    let full_pattern = root.join(glob_pattern);
    let pattern_str = full_pattern.to_string_lossy();
    match glob::glob(&pattern_str) {
        Ok(paths) => paths.filter_map(Result::ok).any(|p| p.is_file()),
        Err(_) => false,
    }
}

/// Paths matching `glob_pattern` under `root`, relative to `root`, used by
/// the Phase Controller to record which artifacts a phase produced.
pub fn matching_paths(root: &Path, glob_pattern: &str) -> Vec<std::path::PathBuf> {
    let full_pattern = root.join(glob_pattern);
    let pattern_str = full_pattern.to_string_lossy();
    match glob::glob(&pattern_str) {
        Ok(paths) => paths
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .filter_map(|p| p.strip_prefix(root).map(|p| p.to_path_buf()).ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
#[path = "acceptance_tests.rs"]
mod tests;
