//! Exchange-agnostic trading surface
//!
//! Both adapters implement [`ExchangeAdapter`], so callers can hold either
//! exchange behind the same interface and receive the same result shapes.

use crate::errors::Result;
use crate::types::{BookLevel, SaleConfirmation, SaleKind, Wallet};
use async_trait::async_trait;
use coinbridge_core::{Amount, Timestamp};

/// Uniform capability set implemented by every exchange adapter.
///
/// Business rejections reported by the exchange are not errors here: they
/// collapse into the documented defaults (`false`, `None`, zero, empty map).
/// `Err` means the request could not be built or no payload was obtained.
#[async_trait(?Send)]
pub trait ExchangeAdapter {
    /// Exchange name
    fn name(&self) -> &str;

    /// Best bid levels of the `b`/`a` market, best first, at most 20
    async fn get_top(&self, currency_a: &str, currency_b: &str) -> Result<Vec<BookLevel>>;

    /// Best ask levels of the `b`/`a` market, best first, at most 20
    async fn get_bottom(&self, currency_a: &str, currency_b: &str) -> Result<Vec<BookLevel>>;

    /// Available balance of every currency held
    async fn get_wallet(&self) -> Result<Wallet>;

    /// Available balance of one currency, zero when unknown
    async fn get_funds(&self, currency: &str) -> Result<Amount>;

    /// Place a sell order of `quantity` `currency` for `market` at `rate`.
    /// Returns the exchange order id, or `None` when the order was rejected.
    async fn create_sale(
        &self,
        currency: &str,
        market: &str,
        quantity: Amount,
        rate: Amount,
        kind: SaleKind,
    ) -> Result<Option<String>>;

    /// Cancel an order; `true` only when the exchange confirms it
    async fn cancel(&self, coin: &str, market: &str, order_id: &str) -> Result<bool>;

    /// Reconcile previously placed sell orders into sold and open subsets
    async fn confirm_sale(
        &self,
        currency: &str,
        market: &str,
        order_ids: &[String],
        since: Option<Timestamp>,
    ) -> Result<SaleConfirmation>;
}
