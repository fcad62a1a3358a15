//! Poloniex response shapes
//!
//! Poloniex returns bare objects and arrays without an envelope; failures
//! come back as `{"error": "..."}`. Numbers are usually quoted strings.

use crate::types::WireScalar;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// `returnOrderBook` for a single pair
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoloniexOrderBook {
    #[serde(default)]
    pub asks: Vec<(WireScalar, WireScalar)>,
    #[serde(default)]
    pub bids: Vec<(WireScalar, WireScalar)>,
    #[serde(rename = "isFrozen")]
    pub is_frozen: Option<WireScalar>,
}

/// One entry of `returnOpenOrders`
#[derive(Debug, Clone, Deserialize)]
pub struct PoloniexOpenOrder {
    #[serde(rename = "orderNumber")]
    pub order_number: WireScalar,
    #[serde(rename = "type")]
    pub side: Option<String>,
    pub rate: Option<WireScalar>,
    pub amount: Option<WireScalar>,
    pub total: Option<WireScalar>,
}

/// One fill from `returnTradeHistory`
#[derive(Debug, Clone, Deserialize)]
pub struct PoloniexTrade {
    #[serde(rename = "orderNumber")]
    pub order_number: WireScalar,
    #[serde(rename = "tradeID")]
    pub trade_id: Option<WireScalar>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub side: Option<String>,
    pub rate: Option<WireScalar>,
    pub amount: Option<WireScalar>,
    pub total: Option<WireScalar>,
}

/// The exchange's `error` message, if the payload is an error object
pub fn error_of(payload: &Value) -> Option<&str> {
    payload.get("error").and_then(Value::as_str)
}

/// Decode a list payload entry by entry, skipping entries that do not fit.
///
/// Anything other than an array (including an error object) is empty.
pub fn parse_list<T: DeserializeOwned>(payload: Value) -> Vec<T> {
    match payload {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// `orderNumber` of a `buy` / `sell` response
pub fn order_number_of(payload: &Value) -> Option<String> {
    let number = payload.get("orderNumber")?;
    serde_json::from_value::<WireScalar>(number.clone())
        .ok()
        .map(|scalar| scalar.to_string())
}
