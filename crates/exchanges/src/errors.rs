//! Exchange error types
//!
//! Only failures that leave the caller without a usable payload become
//! errors. A well-formed response in which the exchange rejects the operation
//! (unknown order, insufficient funds) is passed through to the caller, or
//! collapsed into the documented default by the normalizing adapters.

use thiserror::Error;

/// Result type for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Exchange operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ExchangeError {
    /// Error raised when a private request is attempted without a full key pair
    pub fn missing_credentials(exchange: &str) -> Self {
        Self::Authentication(format!("{exchange}: API key and secret required"))
    }

    /// True for failures where no payload was obtained from the exchange
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::HttpError(..) | Self::Timeout(_) | Self::Serialization(_)
        )
    }
}

impl From<coinbridge_core::AmountError> for ExchangeError {
    fn from(err: coinbridge_core::AmountError) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
