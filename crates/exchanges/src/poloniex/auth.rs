//! Poloniex request signing
//!
//! Every private Poloniex call is a POST to the single trading endpoint. The
//! command travels in the form body next to its parameters and the nonce,
//! and the hex HMAC-SHA512 of that body goes in the `Sign` header.

use crate::auth::{canonicalize, require_credentials, Credentials};
use crate::errors::Result;
use crate::http::HttpRequest;
use crate::types::RequestParams;
use coinbridge_core::NonceSource;

use tracing::debug;

/// Header carrying the API key
pub const KEY_HEADER: &str = "Key";

/// Header carrying the body signature
pub const SIGNATURE_HEADER: &str = "Sign";

/// Poloniex request signer
pub struct PoloniexSigner {
    credentials: Option<Credentials>,
}

impl PoloniexSigner {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self { credentials }
    }

    /// Whether a usable key pair is present
    pub fn has_credentials(&self) -> bool {
        self.credentials.as_ref().is_some_and(Credentials::is_valid)
    }

    /// Build a signed POST of `command` to `private_url`
    pub fn sign_request(
        &self,
        private_url: &str,
        command: &str,
        mut params: RequestParams,
        nonce: &dyn NonceSource,
    ) -> Result<HttpRequest> {
        let credentials = require_credentials(self.credentials.as_ref(), "Poloniex")?;

        params.insert("command", command);
        params.insert("nonce", nonce.next());
        let body = canonicalize(&params);
        let signature = credentials.sign(&body)?;

        debug!("🔐 Signed request: POST {} command={}", private_url, command);

        Ok(HttpRequest::post(private_url)
            .with_form(body)
            .with_header(KEY_HEADER, credentials.key())
            .with_header(SIGNATURE_HEADER, signature))
    }
}
