// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;

#[test]
fn fake_clock_reports_set_value() {
    let clock = FakeClock::new(100);
    assert_eq!(clock.now(), 100);
}

#[test]
fn fake_clock_advance_accumulates() {
    let clock = FakeClock::new(100);
    clock.advance(5);
    clock.advance(5);
    assert_eq!(clock.now(), 110);
}

#[test]
fn system_clock_returns_positive_unix_time() {
    assert!(SystemClock.now() > 0);
}
