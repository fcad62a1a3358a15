//! Credentials and HMAC-SHA512 request signing
//!
//! Both supported exchanges sign requests with a hex-encoded HMAC-SHA512
//! keyed by the API secret. They differ only in what is signed: the full
//! request URL (Bittrex) or the form body (Poloniex). The canonical parameter
//! string defined here is the shared input to both.

use crate::errors::{ExchangeError, Result};
use crate::types::RequestParams;

use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;

type HmacSha512 = Hmac<Sha512>;

/// API key pair held by one adapter.
///
/// The secret is write-only: it can be used to sign but never read back.
#[derive(Clone)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    /// Create new credentials
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Public key identifier
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Both parts present
    pub fn is_valid(&self) -> bool {
        !self.key.is_empty() && !self.secret.is_empty()
    }

    /// Hex HMAC-SHA512 of `payload` keyed by the secret
    pub fn sign(&self, payload: &str) -> Result<String> {
        if !self.is_valid() {
            return Err(ExchangeError::Authentication(
                "API key and secret required".to_string(),
            ));
        }
        hmac_sha512_hex(&self.secret, payload)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Check that a private request may be signed, returning the usable pair
pub fn require_credentials<'a>(
    credentials: Option<&'a Credentials>,
    exchange: &str,
) -> Result<&'a Credentials> {
    match credentials {
        Some(creds) if creds.is_valid() => Ok(creds),
        _ => Err(ExchangeError::missing_credentials(exchange)),
    }
}

/// Canonical parameter string.
///
/// Keys are sorted by their raw (unencoded) name, then each key and value is
/// percent-encoded and the pairs are joined as `key=value` with `&`.
pub fn canonicalize(params: &RequestParams) -> String {
    let mut pairs: Vec<_> = params.iter().collect();
    pairs.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Hex-encoded HMAC-SHA512
pub fn hmac_sha512_hex(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::Signing(format!("HMAC setup failed: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Mask the value of `apikey=` in a URL before it is logged
pub fn redact_api_key(url: &str) -> String {
    match url.find("apikey=") {
        Some(start) => {
            let value_start = start + "apikey=".len();
            let value_end = url[value_start..]
                .find('&')
                .map(|i| value_start + i)
                .unwrap_or(url.len());
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}
