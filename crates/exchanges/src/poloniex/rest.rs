//! Poloniex REST client
//!
//! Public commands are GETs of the public URL with `command` in the query;
//! private commands are signed POSTs to the trading URL.

use crate::auth::Credentials;
use crate::errors::{ExchangeError, Result};
use crate::http::{parse_https_url, HttpClientOptions, HttpRequest, MonoioHttpsClient, Transport};
use crate::poloniex::auth::PoloniexSigner;
use crate::types::{CurrencyPair, PairNotation, RequestParams};
use coinbridge_core::prelude::*;
use coinbridge_core::{log_error, log_latency};

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Poloniex exchange configuration
#[derive(Clone)]
pub struct PoloniexConfig {
    pub api_key: String,
    pub api_secret: String,
    pub public_url: String,
    pub private_url: String,
    pub strict_tls: bool,
    pub timeout_ms: Option<u64>,
}

impl Default for PoloniexConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            public_url: "https://poloniex.com/public".to_string(),
            private_url: "https://poloniex.com/tradingApi".to_string(),
            strict_tls: true,
            timeout_ms: None,
        }
    }
}

impl PoloniexConfig {
    pub fn with_credentials(mut self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self.api_secret = api_secret.into();
        self
    }

    /// Load credentials from `POLONIEX_API_KEY` / `POLONIEX_API_SECRET`
    pub fn with_env_credentials(mut self) -> Result<Self> {
        let api_key = std::env::var("POLONIEX_API_KEY")
            .map_err(|_| ExchangeError::Configuration("POLONIEX_API_KEY not set".to_string()))?;
        let api_secret = std::env::var("POLONIEX_API_SECRET")
            .map_err(|_| ExchangeError::Configuration("POLONIEX_API_SECRET not set".to_string()))?;

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

    pub fn credentials(&self) -> Option<Credentials> {
        if self.api_key.is_empty() && self.api_secret.is_empty() {
            None
        } else {
            Some(Credentials::new(&self.api_key, &self.api_secret))
        }
    }

    pub fn http_options(&self) -> HttpClientOptions {
        HttpClientOptions {
            strict_tls: self.strict_tls,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

impl fmt::Debug for PoloniexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoloniexConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("public_url", &self.public_url)
            .field("private_url", &self.private_url)
            .field("strict_tls", &self.strict_tls)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Poloniex REST client over any [`Transport`]
pub struct PoloniexRestClient<T: Transport = MonoioHttpsClient> {
    config: PoloniexConfig,
    signer: PoloniexSigner,
    nonce: Arc<dyn NonceSource>,
    transport: T,
}

impl PoloniexRestClient<MonoioHttpsClient> {
    /// Create a client on the monoio HTTPS transport
    pub fn new(config: PoloniexConfig) -> Result<Self> {
        let transport = MonoioHttpsClient::with_options(config.http_options())?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> PoloniexRestClient<T> {
    /// Create a client on a caller-supplied transport
    pub fn with_transport(config: PoloniexConfig, transport: T) -> Result<Self> {
        parse_https_url(&config.public_url)?;
        parse_https_url(&config.private_url)?;

        info!("🔗 Poloniex REST client created");
        info!("   Public URL: {}", config.public_url);
        info!("   Strict TLS: {}", config.strict_tls);

        Ok(Self {
            signer: PoloniexSigner::new(config.credentials()),
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

    pub fn config(&self) -> &PoloniexConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.has_credentials()
    }

    // ---- Public ----

    pub async fn return_ticker(&self) -> Result<Value> {
        self.public_request("returnTicker", RequestParams::new()).await
    }

    pub async fn return_24h_volume(&self) -> Result<Value> {
        self.public_request("return24hVolume", RequestParams::new()).await
    }

    /// Order book of pair `a_b`
    pub async fn return_order_book(&self, currency_a: &str, currency_b: &str, depth: usize) -> Result<Value> {
        let params = RequestParams::new()
            .with("currencyPair", pair(currency_a, currency_b))
            .with("depth", depth);
        self.public_request("returnOrderBook", params).await
    }

    // ---- Private ----

    pub async fn return_balances(&self) -> Result<Value> {
        self.private_request("returnBalances", RequestParams::new()).await
    }

    pub async fn return_open_orders(&self, currency_a: &str, currency_b: &str) -> Result<Value> {
        let params = RequestParams::new().with("currencyPair", pair(currency_a, currency_b));
        self.private_request("returnOpenOrders", params).await
    }

    /// Fills on pair `a_b`, from `start` onwards when given
    pub async fn return_trade_history(
        &self,
        currency_a: &str,
        currency_b: &str,
        start: Option<Timestamp>,
    ) -> Result<Value> {
        let mut params = RequestParams::new().with("currencyPair", pair(currency_a, currency_b));
        if let Some(start) = start {
            params.insert("start", start.as_secs());
        }
        self.private_request("returnTradeHistory", params).await
    }

    pub async fn buy(&self, currency_a: &str, currency_b: &str, rate: Amount, amount: Amount) -> Result<Value> {
        let params = RequestParams::new()
            .with("currencyPair", pair(currency_a, currency_b))
            .with("rate", rate)
            .with("amount", amount);
        self.private_request("buy", params).await
    }

    pub async fn sell(&self, currency_a: &str, currency_b: &str, rate: Amount, amount: Amount) -> Result<Value> {
        let params = RequestParams::new()
            .with("currencyPair", pair(currency_a, currency_b))
            .with("rate", rate)
            .with("amount", amount);
        self.private_request("sell", params).await
    }

    /// Sell that fills what it can immediately and cancels the rest
    pub async fn sell_immediate(
        &self,
        currency_a: &str,
        currency_b: &str,
        rate: Amount,
        amount: Amount,
    ) -> Result<Value> {
        let params = RequestParams::new()
            .with("currencyPair", pair(currency_a, currency_b))
            .with("rate", rate)
            .with("amount", amount)
            .with("immediateOrCancel", 1);
        self.private_request("sell", params).await
    }

    pub async fn cancel_order(&self, currency_a: &str, currency_b: &str, order_number: &str) -> Result<Value> {
        let params = RequestParams::new()
            .with("currencyPair", pair(currency_a, currency_b))
            .with("orderNumber", order_number);
        self.private_request("cancelOrder", params).await
    }

    pub async fn withdraw(&self, currency: &str, amount: Amount, address: &str) -> Result<Value> {
        let params = RequestParams::new()
            .with("currency", currency)
            .with("amount", amount)
            .with("address", address);
        self.private_request("withdraw", params).await
    }

    // ---- Request plumbing ----

    async fn public_request(&self, command: &str, mut params: RequestParams) -> Result<Value> {
        params.insert("command", command);
        let request = HttpRequest::get(&self.config.public_url).with_query(params.canonical());

        debug!("📡 GET {}", request.target());
        self.dispatch(command, request).await
    }

    async fn private_request(&self, command: &str, params: RequestParams) -> Result<Value> {
        let request = self.signer.sign_request(
            &self.config.private_url,
            command,
            params,
            self.nonce.as_ref(),
        )?;
        self.dispatch(command, request).await
    }

    async fn dispatch(&self, command: &str, request: HttpRequest) -> Result<Value> {
        let request_id = generate_id();
        let started = Timestamp::now();

        let result = self.transport.execute(request).await;
        log_latency!(format!("poloniex_{command}"), started.elapsed_micros());

        match &result {
            Ok(_) => debug!("[{request_id}] poloniex {command} ok"),
            Err(e) => log_error!(format!("[{request_id}] poloniex {command}"), e),
        }
        result
    }
}

/// Poloniex `A_B` pair name
fn pair(currency_a: &str, currency_b: &str) -> String {
    CurrencyPair::new(currency_a, currency_b).render(PairNotation::Underscore)
}
