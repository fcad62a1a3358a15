//! Nonce and request-id generation
//!
//! Private exchange requests carry a nonce that must strictly increase for
//! the lifetime of the API key. Request ids are short nanoids attached to
//! log lines so a request and its response can be correlated.

use nanoid::nanoid;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::timing::nanos;

/// Source of strictly increasing nonces for private requests
pub trait NonceSource: Send + Sync {
    /// Next nonce, greater than every value previously returned
    fn next(&self) -> u64;
}

/// Clock-seeded nonce generator.
///
/// Values are microseconds since the Unix epoch, bumped by one whenever the
/// clock has not advanced (or went backwards) since the last call. A source
/// seeded at `u64::MAX` stays pinned there instead of wrapping.
#[derive(Debug, Default)]
pub struct MonotonicNonce {
    last: AtomicU64,
}

impl MonotonicNonce {
    /// Create a new generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that never returns a value `<= floor`
    pub fn starting_after(floor: u64) -> Self {
        Self {
            last: AtomicU64::new(floor),
        }
    }
}

impl NonceSource for MonotonicNonce {
    fn next(&self) -> u64 {
        let candidate = nanos() / 1_000;
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(candidate.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        candidate.max(previous.saturating_add(1))
    }
}

/// Generate a unique request id using nanoid
pub fn generate_id() -> String {
    nanoid!(12)
}
