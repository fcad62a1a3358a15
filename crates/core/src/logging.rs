//! Unified logging integration
//!
//! One call sets up the global subscriber for every CoinBridge component.
//! The default backend is tracing-subscriber with an `EnvFilter`; the
//! `ftlog` feature swaps in the ftlog asynchronous backend instead.

use std::sync::Once;
#[cfg(not(feature = "ftlog"))]
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Initialize the logging system. Safe to call more than once.
pub fn init_logging() {
    INIT.call_once(|| {
        #[cfg(feature = "ftlog")]
        {
            init_ftlog();
        }

        #[cfg(not(feature = "ftlog"))]
        {
            init_tracing();
        }
    });
}

#[cfg(feature = "ftlog")]
fn init_ftlog() {
    match ftlog::builder()
        .max_log_level(ftlog::LevelFilter::Debug)
        .bounded(100_000, false)
        .utc()
        .try_init()
    {
        Ok(guard) => {
            // the logger must outlive the process
            std::mem::forget(guard);
            tracing::info!("📝 Initialized ftlog logging");
        }
        Err(e) => eprintln!("ftlog initialization failed: {e}"),
    }
}

#[cfg(not(feature = "ftlog"))]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    // A test harness or host application may already own the global subscriber
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::info!("📝 Initialized tracing logging");
    }
}

/// Log a request latency, switching to milliseconds above 1ms
#[macro_export]
macro_rules! log_latency {
    ($operation:expr, $duration_micros:expr) => {
        if $duration_micros < 1000 {
            tracing::debug!("⚡ {} completed in {}μs", $operation, $duration_micros);
        } else {
            tracing::info!("⚡ {} completed in {:.3}ms", $operation, $duration_micros as f64 / 1000.0);
        }
    };
}

/// Log an order lifecycle action
#[macro_export]
macro_rules! log_order {
    ($action:expr, $order_id:expr, $market:expr) => {
        tracing::info!("📋 ORDER {}: {} ({})", $action, $order_id, $market);
    };
}

/// Log a failed operation
#[macro_export]
macro_rules! log_error {
    ($operation:expr, $error:expr) => {
        tracing::error!("❌ {} failed: {}", $operation, $error);
    };
}
