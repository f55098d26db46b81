//! Crate-level error types.
//!
//! [`SpreadlogError`] unifies every error source (configuration, key
//! material, transport, payload validation) behind a single enum so callers
//! can match on the variant they care about while still using the `?`
//! operator for easy propagation.

use chrono::{DateTime, FixedOffset};

use crate::models::QuoteSide;
use crate::transport::TransportError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpreadlogError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum SpreadlogError {
    /// A required environment variable is missing or unparsable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The private key seed could not be decoded into an Ed25519 key.
    #[error("signing error: {0}")]
    Signing(String),

    /// The HTTP request failed or the server answered with an error status.
    ///
    /// [`PriceClient`](crate::client::PriceClient) logs these and returns
    /// `None` instead of surfacing them.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A required field was absent or had the wrong shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The bid and ask halves of a quote were taken at different instants.
    #[error("bid timestamp {bid} does not match ask timestamp {ask}")]
    TimestampMismatch {
        bid: DateTime<FixedOffset>,
        ask: DateTime<FixedOffset>,
    },

    /// The upstream result set held no quote for the requested side.
    #[error("no {side} quote available for {symbol}")]
    NoQuoteAvailable { symbol: String, side: QuoteSide },

    /// A trading-pair lookup came back empty for the requested symbol.
    #[error("unknown trading pair: {0}")]
    UnknownTradingPair(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
