// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-rules: Rule Set loading, tail-window stream matching, structured
//! in-band signals, and the deceptive-claim scanner.

pub mod deceptive;
pub mod defaults;
pub mod error;
pub mod matcher;
pub mod ruleset;
pub mod signals;

pub use deceptive::{scan_deceptive_claims, DeceptiveClaim, DEFAULT_DECEPTIVE_PATTERNS};
pub use defaults::DEFAULT_RULE_SET_TOML;
pub use error::RuleError;
pub use matcher::{RuleMatch, StreamMatcher};
pub use ruleset::RuleSet;
pub use signals::{SignalScanner, StructuredSignal};
