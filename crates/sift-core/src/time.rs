//! Clock abstraction for testable timestamps.
//!
//! Production code uses `SystemClock`; tests inject a `TestClock` to pin
//! `created_at` and `sent_at` values deterministically.

use std::{
    fmt,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use chrono::{DateTime, TimeZone, Utc};

/// Source of wall-clock timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Controllable clock for deterministic tests.
///
/// Stores microseconds since the Unix epoch; `advance` moves time forward
/// from any thread sharing the clone.
#[derive(Debug, Clone)]
pub struct TestClock {
    micros: Arc<AtomicI64>,
}

impl TestClock {
    /// Creates a test clock pinned to the given start time.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self { micros: Arc::new(AtomicI64::new(start.timestamp_micros())) }
    }

    /// Creates a test clock starting at the current system time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, duration: chrono::Duration) {
        self.micros.fetch_add(duration.num_microseconds().unwrap_or(0), Ordering::AcqRel);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        let micros = self.micros.load(Ordering::Acquire);
        Utc.timestamp_micros(micros).single().unwrap_or_else(Utc::now)
    }
}
