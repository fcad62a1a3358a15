//! Exact decimal amounts
//!
//! Exchanges report balances and prices either as JSON strings or as JSON
//! numbers. `Amount` keeps them as exact decimals so that summing proceeds
//! across many orders never accumulates floating-point error.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt::{self, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Exact decimal quantity (balance, price, proceeds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    /// Zero value
    pub const ZERO: Amount = Amount {
        value: Decimal::ZERO,
    };

    /// Parse a decimal string without losing precision
    pub fn from_str_exact(s: &str) -> Result<Self, AmountError> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| AmountError::InvalidValue(s.to_string()))?;
        Ok(Self { value })
    }

    /// Read an amount from a JSON string or number.
    ///
    /// Numbers are read from their wire text, so every digit the exchange
    /// sent survives. Anything else yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::from_str_exact(s).ok(),
            Value::Number(n) => {
                let text = n.to_string();
                if text.contains(['e', 'E']) {
                    Decimal::from_scientific(&text).ok().map(Self::from)
                } else {
                    Self::from_str_exact(&text).ok()
                }
            }
            _ => None,
        }
    }

    /// Get the underlying Decimal value
    pub fn to_decimal(&self) -> Decimal {
        self.value
    }

    /// Check if the value is zero
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

/// Amount parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Invalid decimal value: {0}")]
    InvalidValue(String),
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount {
            value: self.value + rhs.value,
        }
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount { value }
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value
    }
}

/// Serialized as a decimal string, never as a float
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.value)
    }
}
