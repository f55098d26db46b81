//! Typed models for Robinhood crypto trading API payloads.
//!
//! Every model that comes off the wire is built through a `from_payload`
//! constructor. Those constructors are the only place untrusted JSON is
//! validated: required fields must be present, decimal strings are coerced
//! into numbers, and cross-field invariants are checked.

pub mod estimated_price;
pub mod history_entry;
pub mod order;
pub mod trading_pair;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use estimated_price::{EstimatedBidAndAskPrice, EstimatedOrderPrice, SpreadFields};
pub use history_entry::EstimatedOrderPriceHistoryEntry;
pub use order::{
    OrderConfig, OrderSide, OrderType, PlaceOrderRequest, TimeInForce, new_client_order_id,
};
pub use trading_pair::TradingPair;

/// Which side of the book a single quote describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSide {
    Bid = 0,
    Ask = 1,
}

impl QuoteSide {
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteSide::Bid => "bid",
            QuoteSide::Ask => "ask",
        }
    }
}

impl fmt::Display for QuoteSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side filter for the estimated price endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSide {
    Bid,
    Ask,
    /// Both sides; the endpoint answers with one quote per side and quantity.
    Both,
}

impl PriceSide {
    /// Returns the query-string value expected by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            PriceSide::Bid => "bid",
            PriceSide::Ask => "ask",
            PriceSide::Both => "both",
        }
    }
}

impl From<QuoteSide> for PriceSide {
    fn from(side: QuoteSide) -> Self {
        match side {
            QuoteSide::Bid => PriceSide::Bid,
            QuoteSide::Ask => PriceSide::Ask,
        }
    }
}

/// Decodes every element of the `results` array in a list response.
///
/// # Errors
///
/// Returns [`SpreadlogError::MalformedResponse`](crate::SpreadlogError::MalformedResponse)
/// if `results` is missing or not an array, or the first error `parse`
/// reports for an element.
pub fn results_from_payload<T>(
    payload: &Value,
    parse: impl Fn(&Value) -> crate::Result<T>,
) -> crate::Result<Vec<T>> {
    payload
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            crate::SpreadlogError::MalformedResponse(
                "response has no `results` array".to_string(),
            )
        })?
        .iter()
        .map(parse)
        .collect()
}

/// Coerces a decimal string (or plain JSON number) into an `f64`.
pub(crate) fn decimal_from_value(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid decimal {text:?}: {e}"))?,
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| format!("number {number} does not fit in f64"))?,
        other => return Err(format!("expected decimal string, got {other}")),
    };

    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(format!("decimal {value} is not finite"))
    }
}

/// `deserialize_with` adapter for decimal-string fields.
pub(crate) fn deserialize_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decimal_from_value(&value).map_err(serde::de::Error::custom)
}

/// Wraps a serde failure from a `from_payload` constructor.
pub(crate) fn malformed(model: &str, error: impl fmt::Display) -> crate::SpreadlogError {
    crate::SpreadlogError::MalformedResponse(format!("{model}: {error}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decimal_strings_and_numbers_coerce() {
        assert_eq!(decimal_from_value(&json!("0.000001000000000000")), Ok(0.000001));
        assert_eq!(decimal_from_value(&json!("20.0000000000000000")), Ok(20.0));
        assert_eq!(decimal_from_value(&json!(1.5)), Ok(1.5));
    }

    #[test]
    fn non_decimal_values_are_rejected() {
        assert!(decimal_from_value(&json!("abc")).is_err());
        assert!(decimal_from_value(&json!("NaN")).is_err());
        assert!(decimal_from_value(&json!("inf")).is_err());
        assert!(decimal_from_value(&json!(null)).is_err());
        assert!(decimal_from_value(&json!(true)).is_err());
    }

    #[test]
    fn results_requires_an_array() {
        let parse = |v: &Value| Ok(v.as_i64().unwrap_or_default());

        assert_eq!(
            results_from_payload(&json!({"results": [1, 2]}), parse).unwrap(),
            vec![1, 2]
        );
        assert!(results_from_payload(&json!({"results": null}), parse).is_err());
        assert!(results_from_payload(&json!({}), parse).is_err());
    }

    #[test]
    fn price_side_wire_names() {
        assert_eq!(PriceSide::Both.as_str(), "both");
        assert_eq!(PriceSide::from(QuoteSide::Ask).as_str(), "ask");
    }
}
