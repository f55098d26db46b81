//! Semantic operations over the Robinhood crypto trading API.
//!
//! [`PriceClient`] composes the signed transport, the trading-pair cache and
//! the model constructors. Operations that return typed data use
//! `Result<Option<T>>`: `Ok(None)` means the request itself failed (already
//! logged), `Err` means the response could not be turned into a valid
//! model. Raw operations hand back the upstream JSON untouched.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::Result;
use crate::auth::Signer;
use crate::cache::TtlCache;
use crate::config::RobinhoodConfig;
use crate::models::{
    EstimatedOrderPrice, EstimatedOrderPriceHistoryEntry, OrderConfig, OrderSide, OrderType,
    PlaceOrderRequest, PriceSide, QuoteSide, TradingPair, results_from_payload,
};
use crate::transport::{ApiTransport, HttpMethod, HttpTransport, ReqwestTransport};

pub const ACCOUNTS_PATH: &str = "/api/v1/crypto/trading/accounts/";
pub const TRADING_PAIRS_PATH: &str = "/api/v1/crypto/trading/trading_pairs/";
pub const HOLDINGS_PATH: &str = "/api/v1/crypto/trading/holdings/";
pub const BEST_BID_ASK_PATH: &str = "/api/v1/crypto/marketdata/best_bid_ask/";
pub const ESTIMATED_PRICE_PATH: &str = "/api/v1/crypto/marketdata/estimated_price/";
pub const ORDERS_PATH: &str = "/api/v1/crypto/trading/orders/";

/// Client for account, market data and order endpoints.
#[derive(Debug, Clone)]
pub struct PriceClient {
    transport: ApiTransport,
    trading_pairs: TtlCache<Vec<String>, Vec<TradingPair>>,
}

impl PriceClient {
    /// Builds a client that talks to the configured host over reqwest.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::Signing`](crate::SpreadlogError::Signing)
    /// if the private key seed is malformed.
    pub fn from_config(config: &RobinhoodConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Builds a client over a caller-supplied HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::Signing`](crate::SpreadlogError::Signing)
    /// if the private key seed is malformed.
    pub fn with_transport(config: &RobinhoodConfig, http: Arc<dyn HttpTransport>) -> Result<Self> {
        let signer = Signer::from_base64_seed(config.api_key.clone(), &config.private_key)?;
        let transport = ApiTransport::new(config.base_url.clone(), signer, http);
        Ok(Self::new(transport, config.trading_pair_ttl))
    }

    pub fn new(transport: ApiTransport, trading_pair_ttl: Duration) -> Self {
        Self {
            transport,
            trading_pairs: TtlCache::new(trading_pair_ttl),
        }
    }

    /// Drops every memoized trading-pair lookup.
    pub async fn clear_trading_pair_cache(&self) {
        self.trading_pairs.clear().await;
    }

    /// Fetches the crypto trading account.
    pub async fn get_account(&self) -> Option<Value> {
        self.transport.request(HttpMethod::Get, ACCOUNTS_PATH, "").await
    }

    /// Fetches trading pairs, all of them when `symbols` is empty.
    ///
    /// Results are memoized per ordered symbol list for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::MalformedResponse`](crate::SpreadlogError::MalformedResponse)
    /// if any pair in the response is invalid.
    pub async fn get_trading_pairs<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> Result<Option<Vec<TradingPair>>> {
        let key: Vec<String> = symbols.iter().map(|s| s.as_ref().to_string()).collect();
        let path = format!("{TRADING_PAIRS_PATH}{}", query_params("symbol", key.as_slice()));

        self.trading_pairs
            .get_or_try_insert_with(key, || async {
                info!(path = %path, "Fetching trading pairs");
                let Some(payload) = self.transport.request(HttpMethod::Get, &path, "").await
                else {
                    return Ok(None);
                };
                results_from_payload(&payload, TradingPair::from_payload).map(Some)
            })
            .await
    }

    /// Fetches holdings, all of them when `asset_codes` is empty.
    pub async fn get_holdings<S: AsRef<str>>(&self, asset_codes: &[S]) -> Option<Value> {
        let path = format!("{HOLDINGS_PATH}{}", query_params("asset_code", asset_codes));
        self.transport.request(HttpMethod::Get, &path, "").await
    }

    /// Fetches the best bid and ask, for every pair when `symbols` is empty.
    pub async fn get_best_bid_ask<S: AsRef<str>>(&self, symbols: &[S]) -> Option<Value> {
        let path = format!("{BEST_BID_ASK_PATH}{}", query_params("symbol", symbols));
        self.transport.request(HttpMethod::Get, &path, "").await
    }

    /// Fetches estimated execution prices.
    ///
    /// `quantity` may list several comma-separated quantities; with
    /// [`PriceSide::Both`] the response holds one quote per quantity and side.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::MalformedResponse`](crate::SpreadlogError::MalformedResponse)
    /// if any quote in the response is invalid.
    pub async fn get_estimated_price(
        &self,
        symbol: &str,
        side: PriceSide,
        quantity: &str,
    ) -> Result<Option<Vec<EstimatedOrderPrice>>> {
        let path = format!(
            "{ESTIMATED_PRICE_PATH}?symbol={symbol}&side={}&quantity={quantity}",
            side.as_str()
        );
        let Some(payload) = self.transport.request(HttpMethod::Get, &path, "").await else {
            return Ok(None);
        };
        results_from_payload(&payload, EstimatedOrderPrice::from_payload).map(Some)
    }

    /// Estimated price to sell `quantity` of `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::NoQuoteAvailable`](crate::SpreadlogError::NoQuoteAvailable)
    /// if the response holds no bid quote.
    pub async fn get_estimated_bid_price(
        &self,
        symbol: &str,
        quantity: &str,
    ) -> Result<Option<EstimatedOrderPrice>> {
        self.first_quote(symbol, QuoteSide::Bid, quantity).await
    }

    /// Estimated price to buy `quantity` of `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::NoQuoteAvailable`](crate::SpreadlogError::NoQuoteAvailable)
    /// if the response holds no ask quote.
    pub async fn get_estimated_ask_price(
        &self,
        symbol: &str,
        quantity: &str,
    ) -> Result<Option<EstimatedOrderPrice>> {
        self.first_quote(symbol, QuoteSide::Ask, quantity).await
    }

    async fn first_quote(
        &self,
        symbol: &str,
        side: QuoteSide,
        quantity: &str,
    ) -> Result<Option<EstimatedOrderPrice>> {
        let Some(quotes) = self
            .get_estimated_price(symbol, side.into(), quantity)
            .await?
        else {
            return Ok(None);
        };

        quotes
            .into_iter()
            .find(|quote| quote.side == side)
            .map(Some)
            .ok_or_else(|| crate::SpreadlogError::NoQuoteAvailable {
                symbol: symbol.to_string(),
                side,
            })
    }

    /// How much of `symbol` `usd_amount` buys at the bid price for the
    /// pair's minimum order size.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::UnknownTradingPair`](crate::SpreadlogError::UnknownTradingPair)
    /// if the pair does not exist, or any error of the underlying lookups.
    pub async fn get_quantity_of_crypto(
        &self,
        symbol: &str,
        usd_amount: f64,
    ) -> Result<Option<f64>> {
        let Some(pair) = self.trading_pair(symbol).await? else {
            return Ok(None);
        };
        let quantity = format_quantity(pair.min_order_size);
        let Some(bid) = self.get_estimated_bid_price(symbol, &quantity).await? else {
            return Ok(None);
        };

        if bid.price <= 0.0 {
            return Err(crate::SpreadlogError::MalformedResponse(format!(
                "non-positive bid price {} for {symbol}",
                bid.price
            )));
        }
        Ok(Some(usd_amount / bid.price))
    }

    /// Current bid/ask snapshot for `symbol` at the pair's minimum order size.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::NoQuoteAvailable`](crate::SpreadlogError::NoQuoteAvailable)
    /// if a side has no quote,
    /// [`SpreadlogError::MalformedResponse`](crate::SpreadlogError::MalformedResponse)
    /// if a side has more than one, and
    /// [`SpreadlogError::TimestampMismatch`](crate::SpreadlogError::TimestampMismatch)
    /// if the two quotes were taken at different instants.
    pub async fn get_current_estimated_price(
        &self,
        symbol: &str,
    ) -> Result<Option<EstimatedOrderPriceHistoryEntry>> {
        let Some(pair) = self.trading_pair(symbol).await? else {
            return Ok(None);
        };
        let quantity = format_quantity(pair.min_order_size);
        let Some(quotes) = self
            .get_estimated_price(symbol, PriceSide::Both, &quantity)
            .await?
        else {
            return Ok(None);
        };

        let (bids, asks): (Vec<_>, Vec<_>) = quotes
            .into_iter()
            .partition(|quote| quote.side == QuoteSide::Bid);
        let bid = exactly_one(symbol, QuoteSide::Bid, bids)?;
        let ask = exactly_one(symbol, QuoteSide::Ask, asks)?;

        let entry = EstimatedOrderPriceHistoryEntry::from_quotes(bid, ask)?;
        debug!(
            symbol,
            bid = entry.bid_price,
            ask = entry.ask_price,
            timestamp = %entry.timestamp,
            "Built current estimated price"
        );
        Ok(Some(entry))
    }

    /// Places an order.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadlogError::Json`](crate::SpreadlogError::Json) if the
    /// body cannot be serialized.
    pub async fn place_order(
        &self,
        client_order_id: Uuid,
        side: OrderSide,
        order_type: OrderType,
        symbol: &str,
        order_config: OrderConfig,
    ) -> Result<Option<Value>> {
        let request = PlaceOrderRequest {
            client_order_id,
            side,
            order_type,
            symbol: symbol.to_string(),
            order_config,
        };
        let body = serde_json::to_string(&request)?;

        info!(
            method = "place_order",
            symbol,
            side = ?side,
            order_type = order_type.as_str(),
            client_order_id = %client_order_id,
            "Placing order"
        );
        Ok(self.transport.request(HttpMethod::Post, ORDERS_PATH, &body).await)
    }

    pub async fn cancel_order(&self, order_id: &str) -> Option<Value> {
        let path = format!("{ORDERS_PATH}{order_id}/cancel/");
        info!(method = "cancel_order", order_id, "Cancelling order");
        self.transport.request(HttpMethod::Post, &path, "").await
    }

    pub async fn get_order(&self, order_id: &str) -> Option<Value> {
        let path = format!("{ORDERS_PATH}{order_id}/");
        self.transport.request(HttpMethod::Get, &path, "").await
    }

    pub async fn get_orders(&self) -> Option<Value> {
        self.transport.request(HttpMethod::Get, ORDERS_PATH, "").await
    }

    /// Cached lookup of a single pair by symbol.
    async fn trading_pair(&self, symbol: &str) -> Result<Option<TradingPair>> {
        let Some(pairs) = self.get_trading_pairs(&[symbol]).await? else {
            return Ok(None);
        };
        pairs
            .into_iter()
            .find(|pair| pair.symbol == symbol)
            .map(Some)
            .ok_or_else(|| crate::SpreadlogError::UnknownTradingPair(symbol.to_string()))
    }
}

fn exactly_one(
    symbol: &str,
    side: QuoteSide,
    mut quotes: Vec<EstimatedOrderPrice>,
) -> Result<EstimatedOrderPrice> {
    match quotes.len() {
        0 => Err(crate::SpreadlogError::NoQuoteAvailable {
            symbol: symbol.to_string(),
            side,
        }),
        1 => Ok(quotes.remove(0)),
        n => Err(crate::SpreadlogError::MalformedResponse(format!(
            "expected one {side} quote for {symbol}, got {n}"
        ))),
    }
}

/// Builds `?key=a&key=b`, or an empty string when there are no values.
///
/// Values are not percent-encoded: the signature covers the path exactly as
/// it is sent.
pub fn query_params<S: AsRef<str>>(key: &str, values: &[S]) -> String {
    if values.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = values
        .iter()
        .map(|value| format!("{key}={}", value.as_ref()))
        .collect();
    format!("?{}", pairs.join("&"))
}

/// Renders a quantity in plain decimal notation for the quantity parameter.
pub fn format_quantity(quantity: f64) -> String {
    quantity.to_string()
}
