// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from rule set loading and matching.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read rule set file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule set TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate rule id: {0}")]
    DuplicateId(String),

    #[error("rule {id} has invalid regex: {source}")]
    InvalidRegex {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule set is empty")]
    Empty,
}
