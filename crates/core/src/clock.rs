// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so timing-sensitive logic (heartbeats, phase deadlines,
//! stall detection) can be tested without real sleeps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time and wall-clock timestamps.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for deadlines and interval math.
    fn now(&self) -> Instant;

    /// Milliseconds since the Unix epoch, used for event timestamps.
    fn now_ms(&self) -> u64;
}

/// Real wall-clock time.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Deterministic clock for tests: starts at a fixed instant and only moves
/// when `advance` is called.
#[derive(Clone)]
pub struct FakeClock {
    origin: Instant,
    offset_ms: Arc<AtomicU64>,
    wall_ms: Arc<AtomicU64>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: Arc::new(AtomicU64::new(0)),
            wall_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advance both the monotonic and wall clock by `d`.
    pub fn advance(&self, d: Duration) {
        self.offset_ms
            .fetch_add(d.as_millis() as u64, Ordering::SeqCst);
        self.wall_ms
            .fetch_add(d.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }

    fn now_ms(&self) -> u64 {
        self.wall_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
