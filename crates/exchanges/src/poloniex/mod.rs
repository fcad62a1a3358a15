//! Poloniex exchange integration
//!
//! [`PoloniexRestClient`] exposes the raw commands; [`PoloniexExchange`]
//! reshapes their payloads into the exchange-agnostic types.

pub mod auth;
pub mod rest;
pub mod types;

use crate::errors::Result;
use crate::http::{MonoioHttpsClient, Transport};
use crate::traits::ExchangeAdapter;
use crate::types::{
    BookLevel, BookSide, CurrencyPair, PairNotation, SaleConfirmation, SaleKind, Wallet,
    WireScalar, ORDER_BOOK_DEPTH,
};
use coinbridge_core::{log_order, Amount, PerfTimer, Timestamp};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

pub use auth::{PoloniexSigner, KEY_HEADER, SIGNATURE_HEADER};
pub use rest::{PoloniexConfig, PoloniexRestClient};
pub use types::{PoloniexOpenOrder, PoloniexOrderBook, PoloniexTrade};

const EXCHANGE_NAME: &str = "Poloniex";

/// Poloniex adapter implementing [`ExchangeAdapter`]
pub struct PoloniexExchange<T: Transport = MonoioHttpsClient> {
    rest: PoloniexRestClient<T>,
}

impl PoloniexExchange<MonoioHttpsClient> {
    /// Create an adapter on the monoio HTTPS transport
    pub fn new(config: PoloniexConfig) -> Result<Self> {
        info!("🚀 Initializing Poloniex exchange");
        Ok(Self::with_client(PoloniexRestClient::new(config)?))
    }
}

impl<T: Transport> PoloniexExchange<T> {
    pub fn with_client(rest: PoloniexRestClient<T>) -> Self {
        Self { rest }
    }

    /// Underlying endpoint client
    pub fn rest(&self) -> &PoloniexRestClient<T> {
        &self.rest
    }

    async fn book_side(&self, currency_a: &str, currency_b: &str, side: BookSide) -> Result<Vec<BookLevel>> {
        let _timer = PerfTimer::start(format!("poloniex_book_{side}"));
        let payload = self
            .rest
            .return_order_book(currency_b, currency_a, ORDER_BOOK_DEPTH)
            .await?;
        Ok(normalize_book(payload, side))
    }
}

#[async_trait(?Send)]
impl<T: Transport> ExchangeAdapter for PoloniexExchange<T> {
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
        let payload = self.rest.return_balances().await?;
        Ok(normalize_wallet(payload))
    }

    async fn get_funds(&self, currency: &str) -> Result<Amount> {
        let payload = self.rest.return_balances().await?;
        Ok(normalize_funds(&payload, currency))
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
            SaleKind::Limit => self.rest.sell(market, currency, rate, quantity).await?,
            SaleKind::Market => self.rest.sell_immediate(market, currency, rate, quantity).await?,
        };

        let pair = CurrencyPair::new(market, currency).render(PairNotation::Underscore);
        let order_number = types::order_number_of(&payload);
        match &order_number {
            Some(id) => log_order!("PLACED", id, pair),
            None => warn!(
                "⚠️  Poloniex sale on {} rejected: {}",
                pair,
                types::error_of(&payload).unwrap_or("")
            ),
        }
        Ok(order_number)
    }

    async fn cancel(&self, coin: &str, market: &str, order_id: &str) -> Result<bool> {
        let payload = self.rest.cancel_order(market, coin, order_id).await?;
        let cancelled = cancel_succeeded(&payload);
        if cancelled {
            log_order!("CANCELLED", order_id, EXCHANGE_NAME);
        } else {
            debug!(
                "Cancel of {} not confirmed: {}",
                order_id,
                types::error_of(&payload).unwrap_or("")
            );
        }
        Ok(cancelled)
    }

    async fn confirm_sale(
        &self,
        currency: &str,
        market: &str,
        order_ids: &[String],
        since: Option<Timestamp>,
    ) -> Result<SaleConfirmation> {
        let (open_payload, history_payload) = futures::try_join!(
            self.rest.return_open_orders(market, currency),
            self.rest.return_trade_history(market, currency, since)
        )?;

        let open_orders: Vec<PoloniexOpenOrder> = types::parse_list(open_payload);
        let trades: Vec<PoloniexTrade> = types::parse_list(history_payload);
        let confirmation = reconcile(order_ids, &open_orders, &trades);

        info!(
            "✅ Poloniex sale confirmation: {} sold, {} open, total {}",
            confirmation.sold.len(),
            confirmation.open.len(),
            confirmation.total
        );
        Ok(confirmation)
    }
}

/// `bids` or `asks` of an order book, capped to [`ORDER_BOOK_DEPTH`]
pub fn normalize_book(payload: Value, side: BookSide) -> Vec<BookLevel> {
    let book: PoloniexOrderBook = serde_json::from_value(payload).unwrap_or_default();
    let levels = match side {
        BookSide::Buy => book.bids,
        BookSide::Sell => book.asks,
    };
    levels
        .into_iter()
        .take(ORDER_BOOK_DEPTH)
        .map(|(price, quantity)| BookLevel::new(price.to_string(), quantity.to_string()))
        .collect()
}

/// Balances map passed through; non-scalar values are skipped
pub fn normalize_wallet(payload: Value) -> Wallet {
    match payload {
        Value::Object(balances) => balances
            .into_iter()
            .filter_map(|(currency, value)| {
                serde_json::from_value::<WireScalar>(value)
                    .ok()
                    .map(|available| (currency, available.to_string()))
            })
            .collect(),
        _ => Wallet::new(),
    }
}

/// `balances[currency]`, zero when absent
pub fn normalize_funds(payload: &Value, currency: &str) -> Amount {
    payload
        .get(currency)
        .and_then(Amount::from_json)
        .unwrap_or(Amount::ZERO)
}

/// `success == 1`
pub fn cancel_succeeded(payload: &Value) -> bool {
    payload.get("success").and_then(Value::as_i64) == Some(1)
}

/// Split `order_ids` into still-open and filled orders.
///
/// An id found among the open orders is open with its remaining amount.
/// Otherwise every fill carrying that order number is summed into its
/// proceeds. Ids matching neither are dropped.
pub fn reconcile(
    order_ids: &[String],
    open_orders: &[PoloniexOpenOrder],
    trades: &[PoloniexTrade],
) -> SaleConfirmation {
    let mut confirmation = SaleConfirmation::default();

    for id in order_ids {
        if let Some(order) = open_orders.iter().find(|o| o.order_number.to_string() == *id) {
            confirmation.open.insert(id.clone(), scalar_amount(&order.amount));
            confirmation.total += scalar_amount(&order.total);
            continue;
        }

        let mut fills = trades
            .iter()
            .filter(|trade| trade.order_number.to_string() == *id)
            .peekable();
        if fills.peek().is_none() {
            debug!("Order {} neither open nor filled, dropped", id);
            continue;
        }

        let proceeds: Amount = fills.map(|trade| scalar_amount(&trade.total)).sum();
        confirmation.sold.insert(id.clone(), proceeds);
        confirmation.total += proceeds;
    }

    confirmation
}

fn scalar_amount(value: &Option<WireScalar>) -> Amount {
    value
        .as_ref()
        .and_then(WireScalar::amount)
        .unwrap_or(Amount::ZERO)
}
