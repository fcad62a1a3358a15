//! Bittrex request signing
//!
//! Private Bittrex calls are GET requests whose whole URL is signed:
//! `endpoint?apikey=KEY&<canonical params incl. nonce>`, with the hex
//! HMAC-SHA512 of that exact string sent in the `apisign` header.

use crate::auth::{canonicalize, redact_api_key, require_credentials, Credentials};
use crate::errors::Result;
use crate::http::HttpRequest;
use crate::types::RequestParams;
use coinbridge_core::NonceSource;

use tracing::debug;

/// Header carrying the request signature
pub const SIGNATURE_HEADER: &str = "apisign";

/// Bittrex request signer
pub struct BittrexSigner {
    credentials: Option<Credentials>,
}

impl BittrexSigner {
    /// Create a signer; credentials are checked on every request, not here
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self { credentials }
    }

    /// Whether a usable key pair is present
    pub fn has_credentials(&self) -> bool {
        self.credentials.as_ref().is_some_and(Credentials::is_valid)
    }

    /// Build a signed private request for `endpoint` (which ends with `?`).
    ///
    /// Fails with an authentication error before a nonce is drawn when the
    /// key or secret is missing.
    pub fn sign_request(
        &self,
        endpoint: &str,
        mut params: RequestParams,
        nonce: &dyn NonceSource,
    ) -> Result<HttpRequest> {
        let credentials = require_credentials(self.credentials.as_ref(), "Bittrex")?;

        params.insert("nonce", nonce.next());
        let uri = signed_url(endpoint, credentials.key(), &params);
        let signature = credentials.sign(&uri)?;

        debug!("🔐 Signed request: GET {}", redact_api_key(&uri));

        Ok(HttpRequest::get(uri).with_header(SIGNATURE_HEADER, signature))
    }
}

/// The exact URL that is both requested and signed
pub fn signed_url(endpoint: &str, api_key: &str, params: &RequestParams) -> String {
    format!("{endpoint}apikey={api_key}&{}", canonicalize(params))
}
