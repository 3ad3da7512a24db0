// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Clock abstraction so the engine and its tests don't depend on wall-clock
//! time directly.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current time, injectable for deterministic tests.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Current unix timestamp, in seconds.
    fn now(&self) -> i64;
}

/// Reads the real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
    }
}

/// A clock with a settable value, for tests that need exact timestamps.
#[derive(Debug, Clone)]
pub struct FakeClock {
    now: std::sync::Arc<std::sync::atomic::AtomicI64>,
}

impl FakeClock {
    pub fn new(now: i64) -> Self {
        Self { now: std::sync::Arc::new(std::sync::atomic::AtomicI64::new(now)) }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn advance(&self, by: i64) {
        self.now.fetch_add(by, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> i64 {
        self.now.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
