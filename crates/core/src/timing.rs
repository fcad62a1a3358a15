//! Timestamps and request latency measurement
//!
//! Nanosecond wall-clock timestamps, used both for timing outgoing
//! requests and for the `since` bound when reconciling sales.

use std::time::{SystemTime, UNIX_EPOCH};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wall-clock timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Nanoseconds since Unix epoch
    pub nanos: u64,
}

impl Timestamp {
    /// Create a new timestamp from nanoseconds since Unix epoch
    pub fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Create a timestamp from whole seconds since Unix epoch
    pub fn from_secs(secs: u64) -> Self {
        Self {
            nanos: secs.saturating_mul(1_000_000_000),
        }
    }

    /// Create a timestamp from the current time
    pub fn now() -> Self {
        Self { nanos: nanos() }
    }

    /// Whole seconds since Unix epoch
    pub fn as_secs(&self) -> u64 {
        self.nanos / 1_000_000_000
    }

    /// Microseconds since Unix epoch
    pub fn as_micros(&self) -> u64 {
        self.nanos / 1_000
    }

    /// Convert to chrono DateTime<Utc>
    pub fn to_datetime(&self) -> DateTime<Utc> {
        let secs = self.nanos / 1_000_000_000;
        let nsecs = (self.nanos % 1_000_000_000) as u32;
        DateTime::from_timestamp(secs as i64, nsecs).unwrap_or_else(Utc::now)
    }

    /// Elapsed time since this timestamp in nanoseconds
    pub fn elapsed_nanos(&self) -> u64 {
        nanos().saturating_sub(self.nanos)
    }

    /// Elapsed time since this timestamp in microseconds
    pub fn elapsed_micros(&self) -> u64 {
        self.elapsed_nanos() / 1_000
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        let secs = dt.timestamp().max(0) as u64;
        Self {
            nanos: secs * 1_000_000_000 + dt.timestamp_subsec_nanos() as u64,
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_datetime().format("%Y-%m-%d %H:%M:%S%.9f UTC"))
    }
}

/// Current wall-clock time in nanoseconds since Unix epoch
#[inline]
pub fn nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Request timer; reports on drop unless already reported
pub struct PerfTimer {
    label: String,
    started: Timestamp,
    reported: bool,
}

impl PerfTimer {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            started: Timestamp::now(),
            reported: false,
        }
    }

    pub fn elapsed_micros(&self) -> u64 {
        self.started.elapsed_micros()
    }

    /// Report now instead of on drop
    pub fn log_elapsed(mut self) {
        self.report();
    }

    fn report(&mut self) {
        if self.reported {
            return;
        }
        self.reported = true;
        match self.elapsed_micros() {
            micros @ 0..=999 => tracing::debug!("⏱️  {} took {}μs", self.label, micros),
            micros => tracing::debug!("⏱️  {} took {:.3}ms", self.label, micros as f64 / 1000.0),
        }
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        self.report();
    }
}
