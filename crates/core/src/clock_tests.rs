// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_starts_stationary() {
    let clock = FakeClock::new();
    let t0 = clock.now();
    assert_eq!(clock.now(), t0);
    assert_eq!(clock.now_ms(), 0);
}

#[test]
fn fake_clock_advances_monotonic_and_wall() {
    let clock = FakeClock::new();
    let t0 = clock.now();
    clock.advance(Duration::from_millis(500));
    assert_eq!(clock.now(), t0 + Duration::from_millis(500));
    assert_eq!(clock.now_ms(), 500);
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::new();
    let clone = clock.clone();
    clock.advance(Duration::from_secs(1));
    assert_eq!(clone.now_ms(), 1000);
}

#[test]
fn system_clock_now_ms_is_plausible() {
    let clock = SystemClock;
    // Anything after 2020-01-01 in ms since epoch.
    assert!(clock.now_ms() > 1_577_836_800_000);
}
