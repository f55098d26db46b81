//! Robinhood crypto trading API client library.
//!
//! Provides Ed25519 request signing, a single-attempt HTTP transport, a
//! TTL cache for trading pairs, typed quote models, and a small pipeline
//! that records flattened bid/ask price snapshots.

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod transport;

pub use client::PriceClient;
pub use error::{Result, SpreadlogError};
