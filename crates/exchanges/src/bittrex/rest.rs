//! Bittrex v1.1 REST client
//!
//! Thin endpoint layer: every method builds one request, executes it on the
//! transport and returns the raw JSON payload. Normalization happens in
//! [`super::BittrexExchange`].

use crate::auth::Credentials;
use crate::bittrex::auth::BittrexSigner;
use crate::errors::{ExchangeError, Result};
use crate::http::{parse_https_url, HttpClientOptions, HttpRequest, MonoioHttpsClient, Transport};
use crate::types::{BookSide, CurrencyPair, PairNotation, RequestParams};
use coinbridge_core::prelude::*;
use coinbridge_core::{log_error, log_latency};

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Bittrex exchange configuration
#[derive(Clone)]
pub struct BittrexConfig {
    pub api_key: String,
    pub api_secret: String,
    pub public_url: String,
    pub market_url: String,
    pub account_url: String,
    pub strict_tls: bool,
    pub timeout_ms: Option<u64>,
}

impl Default for BittrexConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            public_url: "https://bittrex.com/api/v1.1/public".to_string(),
            market_url: "https://bittrex.com/api/v1.1/market".to_string(),
            account_url: "https://bittrex.com/api/v1.1/account".to_string(),
            strict_tls: true,
            timeout_ms: None,
        }
    }
}

impl BittrexConfig {
    pub fn with_credentials(mut self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self.api_secret = api_secret.into();
        self
    }

    /// Load credentials from `BITTREX_API_KEY` / `BITTREX_API_SECRET`
    pub fn with_env_credentials(mut self) -> Result<Self> {
        let api_key = std::env::var("BITTREX_API_KEY")
            .map_err(|_| ExchangeError::Configuration("BITTREX_API_KEY not set".to_string()))?;
        let api_secret = std::env::var("BITTREX_API_SECRET")
            .map_err(|_| ExchangeError::Configuration("BITTREX_API_SECRET not set".to_string()))?;

        self.api_key = api_key;
        self.api_secret = api_secret;
        Ok(self)
    }

    pub fn with_strict_tls(mut self, strict: bool) -> Self {
        self.strict_tls = strict;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Key pair, if any part was configured
    pub fn credentials(&self) -> Option<Credentials> {
        if self.api_key.is_empty() && self.api_secret.is_empty() {
            None
        } else {
            Some(Credentials::new(&self.api_key, &self.api_secret))
        }
    }

    /// Transport settings derived from this config
    pub fn http_options(&self) -> HttpClientOptions {
        HttpClientOptions {
            strict_tls: self.strict_tls,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

impl fmt::Debug for BittrexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BittrexConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("public_url", &self.public_url)
            .field("market_url", &self.market_url)
            .field("account_url", &self.account_url)
            .field("strict_tls", &self.strict_tls)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Bittrex REST client over any [`Transport`]
pub struct BittrexRestClient<T: Transport = MonoioHttpsClient> {
    config: BittrexConfig,
    signer: BittrexSigner,
    nonce: Arc<dyn NonceSource>,
    transport: T,
}

impl BittrexRestClient<MonoioHttpsClient> {
    /// Create a client on the monoio HTTPS transport
    pub fn new(config: BittrexConfig) -> Result<Self> {
        let transport = MonoioHttpsClient::with_options(config.http_options())?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> BittrexRestClient<T> {
    /// Create a client on a caller-supplied transport
    pub fn with_transport(config: BittrexConfig, transport: T) -> Result<Self> {
        for base in [&config.public_url, &config.market_url, &config.account_url] {
            parse_https_url(base)?;
        }

        info!("🔗 Bittrex REST client created");
        info!("   Public URL: {}", config.public_url);
        info!("   Strict TLS: {}", config.strict_tls);

        Ok(Self {
            signer: BittrexSigner::new(config.credentials()),
            config,
            nonce: Arc::new(MonotonicNonce::new()),
            transport,
        })
    }

    /// Replace the nonce source
    pub fn with_nonce_source(mut self, nonce: Arc<dyn NonceSource>) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn config(&self) -> &BittrexConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.has_credentials()
    }

    // ---- Public market data ----

    pub async fn get_markets(&self) -> Result<Value> {
        self.public_request("/getmarkets", RequestParams::new()).await
    }

    pub async fn get_currencies(&self) -> Result<Value> {
        self.public_request("/getcurrencies", RequestParams::new()).await
    }

    pub async fn get_ticker(&self, currency_a: &str, currency_b: &str) -> Result<Value> {
        let params = RequestParams::new().with("market", market(currency_a, currency_b));
        self.public_request("/getticker", params).await
    }

    /// Order book of market `a-b`
    pub async fn get_order_book(
        &self,
        currency_a: &str,
        currency_b: &str,
        side: BookSide,
        depth: usize,
    ) -> Result<Value> {
        let params = RequestParams::new()
            .with("market", market(currency_a, currency_b))
            .with("type", side)
            .with("depth", depth);
        self.public_request("/getorderbook", params).await
    }

    pub async fn get_market_summaries(&self) -> Result<Value> {
        self.public_request("/getmarketsummaries", RequestParams::new()).await
    }

    pub async fn get_market_summary(&self, currency_a: &str, currency_b: &str) -> Result<Value> {
        let params = RequestParams::new().with("market", market(currency_a, currency_b));
        self.public_request("/getmarketsummary", params).await
    }

    pub async fn get_market_history(&self, currency_a: &str, currency_b: &str) -> Result<Value> {
        let params = RequestParams::new().with("market", market(currency_a, currency_b));
        self.public_request("/getmarkethistory", params).await
    }

    // ---- Private market ----

    pub async fn buy_limit(
        &self,
        currency_a: &str,
        currency_b: &str,
        quantity: Amount,
        rate: Amount,
    ) -> Result<Value> {
        let params = RequestParams::new()
            .with("market", market(currency_a, currency_b))
            .with("quantity", quantity)
            .with("rate", rate);
        self.private_request(&self.config.market_url, "/buylimit", params).await
    }

    pub async fn buy_market(&self, currency_a: &str, currency_b: &str, quantity: Amount) -> Result<Value> {
        let params = RequestParams::new()
            .with("market", market(currency_a, currency_b))
            .with("quantity", quantity);
        self.private_request(&self.config.market_url, "/buymarket", params).await
    }

    pub async fn sell_limit(
        &self,
        currency_a: &str,
        currency_b: &str,
        quantity: Amount,
        rate: Amount,
    ) -> Result<Value> {
        let params = RequestParams::new()
            .with("market", market(currency_a, currency_b))
            .with("quantity", quantity)
            .with("rate", rate);
        self.private_request(&self.config.market_url, "/selllimit", params).await
    }

    pub async fn sell_market(&self, currency_a: &str, currency_b: &str, quantity: Amount) -> Result<Value> {
        let params = RequestParams::new()
            .with("market", market(currency_a, currency_b))
            .with("quantity", quantity);
        self.private_request(&self.config.market_url, "/sellmarket", params).await
    }

    pub async fn cancel_order(&self, uuid: &str) -> Result<Value> {
        let params = RequestParams::new().with("uuid", uuid);
        self.private_request(&self.config.market_url, "/cancel", params).await
    }

    pub async fn get_open_orders(&self) -> Result<Value> {
        self.private_request(&self.config.market_url, "/getopenorders", RequestParams::new())
            .await
    }

    // ---- Private account ----

    pub async fn get_balances(&self) -> Result<Value> {
        self.private_request(&self.config.account_url, "/getbalances", RequestParams::new())
            .await
    }

    pub async fn get_balance(&self, currency: &str) -> Result<Value> {
        let params = RequestParams::new().with("currency", currency);
        self.private_request(&self.config.account_url, "/getbalance", params).await
    }

    pub async fn get_deposit_address(&self, currency: &str) -> Result<Value> {
        let params = RequestParams::new().with("currency", currency);
        self.private_request(&self.config.account_url, "/getdepositaddress", params).await
    }

    pub async fn withdraw(&self, currency: &str, quantity: Amount, address: &str) -> Result<Value> {
        let params = RequestParams::new()
            .with("currency", currency)
            .with("quantity", quantity)
            .with("address", address);
        self.private_request(&self.config.account_url, "/withdraw", params).await
    }

    pub async fn get_order(&self, uuid: &str) -> Result<Value> {
        let params = RequestParams::new().with("uuid", uuid);
        self.private_request(&self.config.account_url, "/getorder", params).await
    }

    pub async fn get_order_history(&self) -> Result<Value> {
        self.private_request(&self.config.account_url, "/getorderhistory", RequestParams::new())
            .await
    }

    pub async fn get_withdrawal_history(&self, currency: &str, count: u32) -> Result<Value> {
        let params = RequestParams::new()
            .with("currency", currency)
            .with("count", count);
        self.private_request(&self.config.account_url, "/getwithdrawalhistory", params)
            .await
    }

    pub async fn get_deposit_history(&self, currency: &str, count: u32) -> Result<Value> {
        let params = RequestParams::new()
            .with("currency", currency)
            .with("count", count);
        self.private_request(&self.config.account_url, "/getdeposithistory", params)
            .await
    }

    // ---- Request plumbing ----

    /// Unsigned GET of `public_url + command`, with `command` repeated in the query
    async fn public_request(&self, command: &str, params: RequestParams) -> Result<Value> {
        let params = params.with("command", command.trim_start_matches('/'));
        let request = HttpRequest::get(format!("{}{command}", self.config.public_url))
            .with_query(params.canonical());

        debug!("📡 GET {}", request.target());
        self.dispatch(command, request).await
    }

    /// Signed GET of `base + path + "?"`
    async fn private_request(&self, base: &str, path: &str, params: RequestParams) -> Result<Value> {
        let endpoint = format!("{base}{path}?");
        let request = self.signer.sign_request(&endpoint, params, self.nonce.as_ref())?;
        self.dispatch(path, request).await
    }

    async fn dispatch(&self, command: &str, request: HttpRequest) -> Result<Value> {
        let request_id = generate_id();
        let started = Timestamp::now();

        let result = self.transport.execute(request).await;
        log_latency!(format!("bittrex{command}"), started.elapsed_micros());

        match &result {
            Ok(_) => debug!("[{request_id}] bittrex{command} ok"),
            Err(e) => log_error!(format!("[{request_id}] bittrex{command}"), e),
        }
        result
    }
}

/// Bittrex `A-B` market name
fn market(currency_a: &str, currency_b: &str) -> String {
    CurrencyPair::new(currency_a, currency_b).render(PairNotation::Dash)
}
