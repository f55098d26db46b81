//! Flattened bid/ask snapshot used as the price history record.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{EstimatedBidAndAskPrice, EstimatedOrderPrice, QuoteSide};

/// [`EstimatedBidAndAskPrice`] with its two quotes flattened into
/// `bid_*`/`ask_*` fields so stored records need no nested documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedOrderPriceHistoryEntry {
    pub symbol: String,

    // -- Bid --
    pub bid_price: f64,
    pub bid_quantity: f64,
    pub bid_side: QuoteSide,
    pub bid_timestamp: DateTime<FixedOffset>,
    pub bid_price_including_spread: f64,
    pub bid_spread: f64,

    // -- Ask --
    pub ask_price: f64,
    pub ask_quantity: f64,
    pub ask_side: QuoteSide,
    pub ask_timestamp: DateTime<FixedOffset>,
    pub ask_price_including_spread: f64,
    pub ask_spread: f64,

    /// Shared instant of both quotes.
    pub timestamp: DateTime<FixedOffset>,
}

impl EstimatedOrderPriceHistoryEntry {
    /// Validates and flattens a bid/ask pair.
    ///
    /// # Errors
    ///
    /// Fails exactly like [`EstimatedBidAndAskPrice::new`].
    pub fn from_quotes(bid: EstimatedOrderPrice, ask: EstimatedOrderPrice) -> crate::Result<Self> {
        EstimatedBidAndAskPrice::new(bid, ask).map(Self::from)
    }

    /// Rebuilds the nested form from a stored record.
    pub fn to_bid_and_ask(&self) -> EstimatedBidAndAskPrice {
        EstimatedBidAndAskPrice {
            bid: EstimatedOrderPrice {
                symbol: self.symbol.clone(),
                price: self.bid_price,
                quantity: self.bid_quantity,
                side: self.bid_side,
                timestamp: self.bid_timestamp,
                price_including_spread: self.bid_price_including_spread,
                spread: self.bid_spread,
            },
            ask: EstimatedOrderPrice {
                symbol: self.symbol.clone(),
                price: self.ask_price,
                quantity: self.ask_quantity,
                side: self.ask_side,
                timestamp: self.ask_timestamp,
                price_including_spread: self.ask_price_including_spread,
                spread: self.ask_spread,
            },
            timestamp: self.timestamp,
        }
    }
}

impl From<EstimatedBidAndAskPrice> for EstimatedOrderPriceHistoryEntry {
    fn from(quote: EstimatedBidAndAskPrice) -> Self {
        let EstimatedBidAndAskPrice {
            bid,
            ask,
            timestamp,
        } = quote;

        Self {
            symbol: bid.symbol,
            bid_price: bid.price,
            bid_quantity: bid.quantity,
            bid_side: bid.side,
            bid_timestamp: bid.timestamp,
            bid_price_including_spread: bid.price_including_spread,
            bid_spread: bid.spread,
            ask_price: ask.price,
            ask_quantity: ask.quantity,
            ask_side: ask.side,
            ask_timestamp: ask.timestamp,
            ask_price_including_spread: ask.price_including_spread,
            ask_spread: ask.spread,
            timestamp,
        }
    }
}
