//! # CoinBridge Exchange Integrations
//!
//! Bittrex and Poloniex REST clients behind one normalized trading surface.
//!
//! ## Architecture
//!
//! - **monoio-based HTTP client** - Single-threaded async transport with rustls
//! - **Pluggable transport** - Adapters run on any [`Transport`], including mocks
//! - **Per-exchange signing** - HMAC-SHA512 over the signed URL or form body
//! - **Unified interface** - [`ExchangeAdapter`] returns the same shapes for both exchanges

pub mod auth;
pub mod errors;
pub mod http;
pub mod traits;
pub mod types;

#[cfg(feature = "bittrex")]
pub mod bittrex;
#[cfg(feature = "poloniex")]
pub mod poloniex;

// Re-export main types
pub use auth::{canonicalize, hmac_sha512_hex, Credentials};
pub use errors::{ExchangeError, Result};
pub use http::{HttpClientOptions, HttpMethod, HttpRequest, MonoioHttpsClient, Transport};
pub use traits::ExchangeAdapter;
pub use types::*;

#[cfg(feature = "bittrex")]
pub use bittrex::{BittrexConfig, BittrexExchange, BittrexRestClient};
#[cfg(feature = "poloniex")]
pub use poloniex::{PoloniexConfig, PoloniexExchange, PoloniexRestClient};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::auth::Credentials;
    pub use crate::errors::{ExchangeError, Result};
    pub use crate::http::{HttpRequest, MonoioHttpsClient, Transport};
    pub use crate::traits::ExchangeAdapter;
    pub use crate::types::*;
    pub use coinbridge_core::prelude::*;

    #[cfg(feature = "bittrex")]
    pub use crate::bittrex::{BittrexConfig, BittrexExchange};
    #[cfg(feature = "poloniex")]
    pub use crate::poloniex::{PoloniexConfig, PoloniexExchange};
}
