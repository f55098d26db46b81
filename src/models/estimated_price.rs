//! Estimated order price models.
//!
//! The estimated price endpoint returns one quote per side and quantity.
//! Bid and ask quotes name their spread fields differently, so the side
//! decides which pair of keys is read.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{QuoteSide, decimal_from_value, deserialize_decimal, malformed};

/// Wire names of the side-dependent spread fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadFields {
    pub price_including_spread: &'static str,
    pub spread: &'static str,
}

/// Indexed by `QuoteSide as usize`.
const SPREAD_FIELDS: [SpreadFields; 2] = [
    SpreadFields {
        price_including_spread: "bid_inclusive_of_sell_spread",
        spread: "sell_spread",
    },
    SpreadFields {
        price_including_spread: "ask_inclusive_of_buy_spread",
        spread: "buy_spread",
    },
];

impl QuoteSide {
    /// Spread field names carried by quotes on this side.
    pub const fn spread_fields(self) -> SpreadFields {
        SPREAD_FIELDS[self as usize]
    }
}

#[derive(Deserialize)]
struct RawEstimatedOrderPrice {
    symbol: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    price: f64,
    #[serde(deserialize_with = "deserialize_decimal")]
    quantity: f64,
    side: QuoteSide,
    timestamp: DateTime<FixedOffset>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// One side of a price quote for a symbol at a quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimatedOrderPrice {
    pub symbol: String,
    pub price: f64,
    pub quantity: f64,
    pub side: QuoteSide,
    pub timestamp: DateTime<FixedOffset>,
    /// Price after the side's spread is applied.
    pub price_including_spread: f64,
    pub spread: f64,
}

impl EstimatedOrderPrice {
    /// Builds a quote from one element of the estimated price response.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::MalformedResponse`](crate::SpreadlogError::MalformedResponse)
    /// if a field is missing, the side is unknown, the timestamp is not
    /// RFC 3339, or the side's spread fields are absent.
    pub fn from_payload(payload: &Value) -> crate::Result<Self> {
        let raw = RawEstimatedOrderPrice::deserialize(payload)
            .map_err(|e| malformed("estimated price", e))?;

        let fields = raw.side.spread_fields();
        let price_including_spread = spread_value(&raw.rest, fields.price_including_spread)?;
        let spread = spread_value(&raw.rest, fields.spread)?;

        Ok(Self {
            symbol: raw.symbol,
            price: raw.price,
            quantity: raw.quantity,
            side: raw.side,
            timestamp: raw.timestamp,
            price_including_spread,
            spread,
        })
    }
}

fn spread_value(rest: &Map<String, Value>, field: &str) -> crate::Result<f64> {
    let value = rest
        .get(field)
        .ok_or_else(|| malformed("estimated price", format!("missing field `{field}`")))?;
    decimal_from_value(value).map_err(|e| malformed("estimated price", format!("{field}: {e}")))
}

/// A bid and an ask quote for the same symbol taken at the same instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimatedBidAndAskPrice {
    pub bid: EstimatedOrderPrice,
    pub ask: EstimatedOrderPrice,
    pub timestamp: DateTime<FixedOffset>,
}

impl EstimatedBidAndAskPrice {
    /// Pairs a bid with an ask.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::MalformedResponse`](crate::SpreadlogError::MalformedResponse)
    /// if a quote sits in the wrong slot, and
    /// [`SpreadlogError::TimestampMismatch`](crate::SpreadlogError::TimestampMismatch)
    /// if the two timestamps differ.
    pub fn new(bid: EstimatedOrderPrice, ask: EstimatedOrderPrice) -> crate::Result<Self> {
        if bid.side != QuoteSide::Bid || ask.side != QuoteSide::Ask {
            return Err(malformed(
                "bid and ask price",
                format!("expected bid/ask quotes, got {}/{}", bid.side, ask.side),
            ));
        }
        if bid.timestamp != ask.timestamp {
            return Err(crate::SpreadlogError::TimestampMismatch {
                bid: bid.timestamp,
                ask: ask.timestamp,
            });
        }

        let timestamp = bid.timestamp;
        Ok(Self {
            bid,
            ask,
            timestamp,
        })
    }

    /// Builds the pair from a `{"bid": {...}, "ask": {...}}` payload.
    ///
    /// # Errors
    ///
    /// Fails like [`EstimatedOrderPrice::from_payload`] for either half, or
    /// like [`new`](Self::new) when pairing them.
    pub fn from_payload(payload: &Value) -> crate::Result<Self> {
        let half = |key: &str| {
            payload
                .get(key)
                .ok_or_else(|| malformed("bid and ask price", format!("missing field `{key}`")))
                .and_then(EstimatedOrderPrice::from_payload)
        };

        Self::new(half("bid")?, half("ask")?)
    }
}
