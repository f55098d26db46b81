//! Trading pair reference data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{deserialize_decimal, malformed};

/// A tradable asset/quote pair and its order-size constraints.
///
/// Sizes and increments arrive as decimal strings and are held as `f64`,
/// which is precise enough for price estimation but not for order sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPair {
    /// Asset code (e.g., "BTC").
    pub asset_code: String,
    /// Quote currency code (e.g., "USD").
    pub quote_code: String,
    /// Smallest step in which the asset quantity can change.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub asset_increment: f64,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub min_order_size: f64,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub max_order_size: f64,
    /// Price tick size in the quote currency.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub quote_increment: f64,
    /// Trading status (e.g., "tradable").
    pub status: String,
    /// Canonical `ASSET-QUOTE` symbol.
    pub symbol: String,
}

impl TradingPair {
    /// Builds a trading pair from one element of the trading pairs response.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::MalformedResponse`](crate::SpreadlogError::MalformedResponse)
    /// if a field is missing or a numeric field is not a decimal.
    pub fn from_payload(payload: &Value) -> crate::Result<Self> {
        Self::deserialize(payload).map_err(|e| malformed("trading pair", e))
    }

    pub fn is_tradable(&self) -> bool {
        self.status == "tradable"
    }
}
