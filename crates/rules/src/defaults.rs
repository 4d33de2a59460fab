// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The small default Rule Set shipped with the controller (spec §1: "the
//! rules/patterns catalog content... shipped with a small default set").

/// Built-in rule set, in TOML form, loaded when no `rules_path` override
/// is configured.
pub const DEFAULT_RULE_SET_TOML: &str = r#"
[[rule]]
id = "destructive-rm"
regex = "rm\\s+-rf\\s+/(?:\\s|$)"
severity = "interrupt"
corrective_message = "Stop. Destructive filesystem commands are forbidden. Continue with the assigned task."
escalating = true

[[rule]]
id = "force-push"
regex = "git push\\s+.*--force"
severity = "interrupt"
corrective_message = "Force-pushing is forbidden here. Use a regular push or ask for guidance."

[[rule]]
id = "planning-language-in-execution"
regex = "(?i)\\b(i would|let me think|i'm thinking about|in theory)\\b"
severity = "interrupt"
corrective_message = "Stop planning. Create the file now."
phase_scope = "execution"

[[rule]]
id = "write-attempt-in-research"
regex = "(?i)\\b(writing to|creating file|mkdir|touch)\\b"
severity = "interrupt"
corrective_message = "This phase is read-only research. Do not write files yet."
phase_scope = "research"

[[rule]]
id = "credential-leak"
regex = "(?i)(api[_-]?key|secret|password)\\s*[:=]\\s*['\"]?[A-Za-z0-9_\\-]{12,}"
severity = "warn"
corrective_message = "Possible credential printed to output. Avoid echoing secrets."
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::RuleSet;

    #[test]
    fn default_rule_set_parses_and_validates() {
        let set = RuleSet::parse(DEFAULT_RULE_SET_TOML).unwrap();
        assert!(set.len() >= 5);
    }
}
