//! # CoinBridge Core
//!
//! Shared building blocks for the exchange adapters.
//!
//! ## Contents
//!
//! 1. **Exact decimal amounts** - balances and proceeds never pass through `f64`
//! 2. **Nanosecond timing** - request latency and `since` bounds
//! 3. **Nonce generation** - strictly increasing values for private requests
//! 4. **Unified logging** - tracing subscriber bootstrap and logging macros

pub mod timing;
pub mod amount;
pub mod logging;
pub mod id_gen;

// Re-export commonly used items
pub use timing::{nanos, PerfTimer, Timestamp};
pub use amount::{Amount, AmountError};
pub use logging::init_logging;
pub use id_gen::{generate_id, MonotonicNonce, NonceSource};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::timing::{nanos, PerfTimer, Timestamp};
    pub use crate::amount::{Amount, AmountError};
    pub use crate::id_gen::{generate_id, MonotonicNonce, NonceSource};
    pub use crate::logging::init_logging;

    // Common external types
    pub use serde::{Deserialize, Serialize};
    pub use chrono::{DateTime, Utc};
}
