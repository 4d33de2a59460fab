// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-adapters: pty backends for the worker execution pipeline.

pub mod error;
pub mod pty;

pub use error::PtyError;
pub use pty::real::RealPtyAdapter;
pub use pty::{PtyAdapter, PtyOutput, SpawnSpec};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use pty::fake::{FakePtyAdapter, PtyCall};
