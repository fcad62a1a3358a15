//! Bittrex v1.1 response shapes
//!
//! Every Bittrex payload is wrapped in `{success, message, result}`. Numeric
//! fields arrive as JSON numbers and are kept as [`WireScalar`]s.

use crate::types::WireScalar;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Common response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct BittrexResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub result: Option<T>,
}

impl<T: DeserializeOwned> BittrexResponse<T> {
    /// Decode a raw payload; a payload that does not fit `T` yields `None`
    pub fn parse(payload: Value) -> Option<Self> {
        serde_json::from_value(payload).ok()
    }

    /// The `result` member, if present and well-formed
    pub fn result_of(payload: Value) -> Option<T> {
        Self::parse(payload).and_then(|response| response.result)
    }
}

/// Decode `result[]` entry by entry, skipping entries that do not fit.
///
/// A missing, null or non-array `result` is empty.
pub fn result_entries<T: DeserializeOwned>(payload: Value) -> Vec<T> {
    match payload {
        Value::Object(mut envelope) => match envelope.remove("result") {
            Some(Value::Array(entries)) => entries
                .into_iter()
                .filter_map(|entry| serde_json::from_value(entry).ok())
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// One order-book entry from `getorderbook`
#[derive(Debug, Clone, Deserialize)]
pub struct BittrexBookEntry {
    #[serde(rename = "Quantity")]
    pub quantity: WireScalar,
    #[serde(rename = "Rate")]
    pub rate: WireScalar,
}

/// One balance from `getbalances` / `getbalance`
#[derive(Debug, Clone, Deserialize)]
pub struct BittrexBalance {
    #[serde(rename = "Currency", default)]
    pub currency: String,
    #[serde(rename = "Balance")]
    pub balance: Option<WireScalar>,
    #[serde(rename = "Available")]
    pub available: Option<WireScalar>,
    #[serde(rename = "Pending")]
    pub pending: Option<WireScalar>,
}

/// Order details from `getorder`
#[derive(Debug, Clone, Deserialize)]
pub struct BittrexOrder {
    #[serde(rename = "OrderUuid")]
    pub order_uuid: Option<String>,
    #[serde(rename = "Exchange")]
    pub exchange: Option<String>,
    #[serde(rename = "Quantity")]
    pub quantity: Option<WireScalar>,
    #[serde(rename = "QuantityRemaining")]
    pub quantity_remaining: Option<WireScalar>,
    #[serde(rename = "Price")]
    pub price: Option<WireScalar>,
    #[serde(rename = "IsOpen")]
    pub is_open: Option<bool>,
}

/// Result of `getdepositaddress`
#[derive(Debug, Clone, Deserialize)]
pub struct BittrexDepositAddress {
    #[serde(rename = "Currency")]
    pub currency: Option<String>,
    #[serde(rename = "Address")]
    pub address: Option<String>,
}

/// Order id from a `selllimit` / `sellmarket` response.
///
/// Reads `result[0].resultUuid`, falling back to `result.uuid`.
pub fn order_id_of(payload: &Value) -> Option<String> {
    let result = payload.get("result")?;
    result
        .get(0)
        .and_then(|first| first.get("resultUuid"))
        .or_else(|| result.get("uuid"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
