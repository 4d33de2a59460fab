// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads and schema-validates the Rule Set (spec §3/§4.2) from a TOML
//! document, and holds it compiled and ready to match.

use crate::error::RuleError;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use warden_core::{PhaseName, Rule, RuleId, Severity};

/// On-disk shape: `[[rule]]` inline tables, matching the reference
/// codebase's `[[...]]`-array-of-tables convention for declarative data.
#[derive(Debug, Deserialize)]
struct RuleDocument {
    #[serde(rename = "rule", default)]
    rules: Vec<RuleDef>,
}

#[derive(Debug, Deserialize)]
struct RuleDef {
    id: String,
    regex: String,
    severity: Severity,
    #[serde(default)]
    corrective_message: Option<String>,
    #[serde(default)]
    phase_scope: Option<PhaseName>,
    #[serde(default)]
    escalating: bool,
}

/// One rule paired with its compiled matcher, kept in declared order
/// (rules are evaluated in order, spec §4.2).
pub(crate) struct CompiledRule {
    pub rule: Rule,
    pub regex: Regex,
}

/// A loaded, validated, compiled Rule Set. Immutable after construction.
pub struct RuleSet {
    pub(crate) rules: Vec<CompiledRule>,
    /// Longest possible match span across all rules, used to size the
    /// stream matcher's window overlap.
    pub(crate) max_pattern_len: usize,
}

impl RuleSet {
    /// Load and validate a rule set from a TOML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RuleError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse and validate a rule set from a TOML string.
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        let doc: RuleDocument = toml::from_str(text)?;
        Self::from_defs(doc.rules)
    }

    /// Build directly from already-constructed `Rule` values (used by the
    /// built-in default set and by tests).
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, RuleError> {
        let defs = rules
            .into_iter()
            .map(|r| RuleDef {
                id: r.id.as_str().to_string(),
                regex: r.regex,
                severity: r.severity,
                corrective_message: r.corrective_message,
                phase_scope: r.phase_scope,
                escalating: r.escalating,
            })
            .collect();
        Self::from_defs(defs)
    }

    fn from_defs(defs: Vec<RuleDef>) -> Result<Self, RuleError> {
        if defs.is_empty() {
            return Err(RuleError::Empty);
        }

        let mut seen = HashSet::with_capacity(defs.len());
        let mut rules = Vec::with_capacity(defs.len());
        let mut max_pattern_len = 0usize;

        for def in defs {
            if !seen.insert(def.id.clone()) {
                return Err(RuleError::DuplicateId(def.id));
            }
            let regex = Regex::new(&def.regex).map_err(|source| RuleError::InvalidRegex {
                id: def.id.clone(),
                source,
            })?;
            max_pattern_len = max_pattern_len.max(estimate_max_match_len(&def.regex));

            let rule = Rule {
                id: RuleId::new(def.id),
                regex: def.regex,
                severity: def.severity,
                corrective_message: def.corrective_message,
                phase_scope: def.phase_scope,
                escalating: def.escalating,
            };
            rules.push(CompiledRule { rule, regex });
        }

        Ok(Self {
            rules,
            max_pattern_len: max_pattern_len.max(64),
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|c| &c.rule)
    }
}

/// Regex patterns don't carry a reliable static max-match length, so this
/// is a heuristic: count literal-ish characters and pad generously. Good
/// enough to size a window overlap that is never too small by more than a
/// constant factor; correctness of matching itself does not depend on it.
fn estimate_max_match_len(pattern: &str) -> usize {
    (pattern.len() * 4).clamp(64, 4096)
}

#[cfg(test)]
#[path = "ruleset_tests.rs"]
mod tests;
