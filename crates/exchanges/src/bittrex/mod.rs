//! Bittrex exchange integration
//!
//! [`BittrexRestClient`] exposes the raw v1.1 endpoints; [`BittrexExchange`]
//! wraps it and reshapes each payload into the exchange-agnostic types.

pub mod auth;
pub mod rest;
pub mod types;

use crate::errors::{ExchangeError, Result};
use crate::http::{MonoioHttpsClient, Transport};
use crate::traits::ExchangeAdapter;
use crate::types::{
    BookLevel, BookSide, CurrencyPair, PairNotation, SaleConfirmation, SaleKind, Wallet,
    WireScalar, ORDER_BOOK_DEPTH,
};
use coinbridge_core::{log_order, Amount, PerfTimer, Timestamp};

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

pub use auth::{BittrexSigner, SIGNATURE_HEADER};
pub use rest::{BittrexConfig, BittrexRestClient};
pub use types::{
    result_entries, BittrexBalance, BittrexBookEntry, BittrexDepositAddress, BittrexOrder,
    BittrexResponse,
};

const EXCHANGE_NAME: &str = "Bittrex";

/// Bittrex adapter implementing [`ExchangeAdapter`]
pub struct BittrexExchange<T: Transport = MonoioHttpsClient> {
    rest: BittrexRestClient<T>,
}

impl BittrexExchange<MonoioHttpsClient> {
    /// Create an adapter on the monoio HTTPS transport
    pub fn new(config: BittrexConfig) -> Result<Self> {
        info!("🚀 Initializing Bittrex exchange");
        Ok(Self::with_client(BittrexRestClient::new(config)?))
    }
}

impl<T: Transport> BittrexExchange<T> {
    pub fn with_client(rest: BittrexRestClient<T>) -> Self {
        Self { rest }
    }

    /// Underlying endpoint client
    pub fn rest(&self) -> &BittrexRestClient<T> {
        &self.rest
    }

    /// Deposit address for `currency`, `None` when the exchange has none
    pub async fn get_address(&self, currency: &str) -> Result<Option<String>> {
        let payload = self.rest.get_deposit_address(currency).await?;
        Ok(normalize_address(payload))
    }

    async fn book_side(&self, currency_a: &str, currency_b: &str, side: BookSide) -> Result<Vec<BookLevel>> {
        let _timer = PerfTimer::start(format!("bittrex_book_{side}"));
        let payload = self
            .rest
            .get_order_book(currency_b, currency_a, side, ORDER_BOOK_DEPTH)
            .await?;
        Ok(normalize_book(payload))
    }
}

#[async_trait(?Send)]
impl<T: Transport> ExchangeAdapter for BittrexExchange<T> {
    fn name(&self) -> &str {
        EXCHANGE_NAME
    }

    async fn get_top(&self, currency_a: &str, currency_b: &str) -> Result<Vec<BookLevel>> {
        self.book_side(currency_a, currency_b, BookSide::Buy).await
    }

    async fn get_bottom(&self, currency_a: &str, currency_b: &str) -> Result<Vec<BookLevel>> {
        self.book_side(currency_a, currency_b, BookSide::Sell).await
    }

    async fn get_wallet(&self) -> Result<Wallet> {
        let payload = self.rest.get_balances().await?;
        Ok(normalize_wallet(payload))
    }

    async fn get_funds(&self, currency: &str) -> Result<Amount> {
        let payload = self.rest.get_balance(currency).await?;
        Ok(normalize_funds(payload))
    }

    async fn create_sale(
        &self,
        currency: &str,
        market: &str,
        quantity: Amount,
        rate: Amount,
        kind: SaleKind,
    ) -> Result<Option<String>> {
        let payload = match kind {
            SaleKind::Limit => self.rest.sell_limit(market, currency, quantity, rate).await?,
            SaleKind::Market => self.rest.sell_market(market, currency, quantity).await?,
        };

        let pair = CurrencyPair::new(market, currency).render(PairNotation::Dash);
        let order_id = types::order_id_of(&payload);
        match &order_id {
            Some(id) => log_order!("PLACED", id, pair),
            None => warn!("⚠️  Bittrex sale on {} rejected: {}", pair, message_of(&payload)),
        }
        Ok(order_id)
    }

    async fn cancel(&self, _coin: &str, _market: &str, order_id: &str) -> Result<bool> {
        let payload = self.rest.cancel_order(order_id).await?;
        let cancelled = cancel_succeeded(&payload);
        if cancelled {
            log_order!("CANCELLED", order_id, EXCHANGE_NAME);
        } else {
            debug!("Cancel of {} not confirmed: {}", order_id, message_of(&payload));
        }
        Ok(cancelled)
    }

    async fn confirm_sale(
        &self,
        _currency: &str,
        _market: &str,
        order_ids: &[String],
        _since: Option<Timestamp>,
    ) -> Result<SaleConfirmation> {
        if !self.rest.has_credentials() {
            return Err(ExchangeError::missing_credentials(EXCHANGE_NAME));
        }

        let lookups = order_ids
            .iter()
            .map(|id| async move { (id, self.rest.get_order(id).await) });
        let outcomes = join_all(lookups).await;

        let mut confirmation = SaleConfirmation::default();
        let mut first_error = None;

        for (id, outcome) in outcomes {
            let payload = match outcome {
                Ok(payload) => payload,
                Err(e) => {
                    first_error.get_or_insert(e);
                    continue;
                }
            };
            let Some(order) = BittrexResponse::<BittrexOrder>::result_of(payload) else {
                debug!("Order {} not found, dropped", id);
                continue;
            };
            apply_order(&mut confirmation, id, &order);
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        info!(
            "✅ Bittrex sale confirmation: {} sold, {} open, total {}",
            confirmation.sold.len(),
            confirmation.open.len(),
            confirmation.total
        );
        Ok(confirmation)
    }
}

/// `result[]` of an order book response, capped to [`ORDER_BOOK_DEPTH`]
pub fn normalize_book(payload: Value) -> Vec<BookLevel> {
    result_entries::<BittrexBookEntry>(payload)
        .into_iter()
        .take(ORDER_BOOK_DEPTH)
        .map(|entry| BookLevel::new(entry.rate.to_string(), entry.quantity.to_string()))
        .collect()
}

/// `Currency -> Available` over every balance; a null balance reads as `"0"`
pub fn normalize_wallet(payload: Value) -> Wallet {
    result_entries::<BittrexBalance>(payload)
        .into_iter()
        .map(|balance| {
            let available = balance
                .available
                .map(|value| value.to_string())
                .unwrap_or_else(|| "0".to_string());
            (balance.currency, available)
        })
        .collect()
}

/// `result.Available`, zero when absent
pub fn normalize_funds(payload: Value) -> Amount {
    BittrexResponse::<BittrexBalance>::result_of(payload)
        .and_then(|balance| balance.available)
        .and_then(|available| available.amount())
        .unwrap_or(Amount::ZERO)
}

/// `result.Address`
pub fn normalize_address(payload: Value) -> Option<String> {
    BittrexResponse::<BittrexDepositAddress>::result_of(payload).and_then(|result| result.address)
}

/// `success == true`
pub fn cancel_succeeded(payload: &Value) -> bool {
    payload.get("success").and_then(Value::as_bool) == Some(true)
}

fn apply_order(confirmation: &mut SaleConfirmation, id: &str, order: &BittrexOrder) {
    let price = order
        .price
        .as_ref()
        .and_then(WireScalar::amount)
        .unwrap_or(Amount::ZERO);
    confirmation.total += price;

    match order.is_open {
        Some(true) => {
            let remaining = order
                .quantity_remaining
                .as_ref()
                .and_then(WireScalar::amount)
                .unwrap_or(Amount::ZERO);
            confirmation.open.insert(id.to_string(), remaining);
        }
        Some(false) => {
            confirmation.sold.insert(id.to_string(), price);
        }
        None => debug!("Order {} has no IsOpen flag", id),
    }
}

fn message_of(payload: &Value) -> &str {
    payload.get("message").and_then(Value::as_str).unwrap_or("")
}
