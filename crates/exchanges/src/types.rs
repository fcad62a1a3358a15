//! Exchange-agnostic types shared by both adapters
//!
//! Normalized result shapes (order-book levels, wallets, sale confirmations)
//! plus the request parameter map and currency-pair notation handling.

use coinbridge_core::Amount;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::auth::canonicalize;

/// Number of order-book levels returned by top/bottom of book
pub const ORDER_BOOK_DEPTH: usize = 20;

/// Available balance per currency symbol, kept as wire decimal strings
pub type Wallet = BTreeMap<String, String>;

/// Wire notation of a currency pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairNotation {
    /// `BTC-LTC` (Bittrex)
    Dash,
    /// `BTC_LTC` (Poloniex)
    Underscore,
}

impl PairNotation {
    /// Separator character between the two symbols
    pub fn separator(&self) -> char {
        match self {
            PairNotation::Dash => '-',
            PairNotation::Underscore => '_',
        }
    }
}

/// Ordered pair of currency symbols
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    /// Create a new pair
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Render into the exchange's wire notation
    pub fn render(&self, notation: PairNotation) -> String {
        format!("{}{}{}", self.base, notation.separator(), self.quote)
    }

    /// Parse a pair rendered in `notation`.
    ///
    /// Splits on the first separator; both sides must be non-empty.
    pub fn parse(text: &str, notation: PairNotation) -> Option<Self> {
        let (base, quote) = text.split_once(notation.separator())?;
        if base.is_empty() || quote.is_empty() {
            return None;
        }
        Some(Self::new(base, quote))
    }
}

/// Request parameters keyed by raw name.
///
/// Insertion order is never observable: the wire form is always the
/// canonical (sorted, percent-encoded) string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(HashMap<String, String>);

impl RequestParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    /// Look up a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Remove a parameter, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameters in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonical `k=v&k=v` form used on the wire and as signature input
    pub fn canonical(&self) -> String {
        canonicalize(self)
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// JSON scalar that may arrive as a string or as a number.
///
/// Keeps the wire text so normalized results reproduce exactly what the
/// exchange sent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireScalar {
    Text(String),
    Number(serde_json::Number),
}

impl WireScalar {
    /// Exact decimal value, if the scalar is numeric
    pub fn amount(&self) -> Option<Amount> {
        match self {
            WireScalar::Text(s) => Amount::from_str_exact(s).ok(),
            WireScalar::Number(n) => Amount::from_json(&serde_json::Value::Number(n.clone())),
        }
    }
}

impl fmt::Display for WireScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireScalar::Text(s) => f.write_str(s),
            WireScalar::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One price level of an order book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: String,
    pub quantity: String,
}

impl BookLevel {
    pub fn new(price: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            quantity: quantity.into(),
        }
    }
}

/// Side of the book to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookSide {
    /// Bids, best (highest) first
    Buy,
    /// Asks, best (lowest) first
    Sell,
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookSide::Buy => write!(f, "buy"),
            BookSide::Sell => write!(f, "sell"),
        }
    }
}

/// How a sale order is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SaleKind {
    /// Rest on the book at the given rate
    #[default]
    Limit,
    /// Take whatever liquidity is available now
    Market,
}

/// Reconciliation of previously placed sell orders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaleConfirmation {
    /// Order id -> filled amount
    pub sold: BTreeMap<String, Amount>,
    /// Order id -> remaining amount
    pub open: BTreeMap<String, Amount>,
    /// Aggregate proceeds over every matched order
    pub total: Amount,
}
