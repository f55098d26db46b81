//! Payload decoding tests for the trading pair and quote models.

mod common;

use chrono::{DateTime, FixedOffset};
use serde_json::{Value, json};

use spreadlog::SpreadlogError;
use spreadlog::models::{
    EstimatedBidAndAskPrice, EstimatedOrderPrice, EstimatedOrderPriceHistoryEntry, QuoteSide,
    TradingPair, results_from_payload,
};

use common::{ESTIMATED_BOTH_JSON, TRADING_PAIRS_JSON};

fn quotes() -> Vec<EstimatedOrderPrice> {
    let payload: Value = serde_json::from_str(ESTIMATED_BOTH_JSON).unwrap();
    results_from_payload(&payload, EstimatedOrderPrice::from_payload).unwrap()
}

fn at(timestamp: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(timestamp).unwrap()
}

#[test]
fn test_trading_pair_deserializes() {
    let payload: Value = serde_json::from_str(TRADING_PAIRS_JSON).unwrap();
    let pairs = results_from_payload(&payload, TradingPair::from_payload).unwrap();

    assert_eq!(pairs.len(), 1);
    let btc = &pairs[0];
    assert_eq!(btc.symbol, "BTC-USD");
    assert_eq!(btc.asset_code, "BTC");
    assert_eq!(btc.quote_code, "USD");
    assert_eq!(btc.min_order_size, 0.000001);
    assert_eq!(btc.max_order_size, 20.0);
    assert_eq!(btc.asset_increment, 0.00000001);
    assert_eq!(btc.quote_increment, 0.01);
    assert_eq!(btc.status, "tradable");
    assert!(btc.is_tradable());
}

#[test]
fn test_trading_pair_ignores_unknown_fields() {
    let pair = TradingPair::from_payload(&json!({
        "asset_code": "ETH",
        "asset_increment": "0.0000001",
        "max_order_size": "500",
        "min_order_size": "0.0001",
        "quote_code": "USD",
        "quote_increment": "0.01",
        "status": "untradable",
        "symbol": "ETH-USD",
        "listed_at": "2024-01-01"
    }))
    .unwrap();

    assert_eq!(pair.symbol, "ETH-USD");
    assert!(!pair.is_tradable());
}

#[test]
fn test_bid_quote_reads_sell_spread_fields() {
    let bid = &quotes()[0];

    assert_eq!(bid.side, QuoteSide::Bid);
    assert_eq!(bid.symbol, "SHIB-USD");
    assert_eq!(bid.price, 0.00001943);
    assert_eq!(bid.quantity, 800.0);
    assert_eq!(bid.price_including_spread, 0.00001933);
    assert_eq!(bid.spread, 0.00514668);
}

#[test]
fn test_ask_quote_reads_buy_spread_fields() {
    let ask = &quotes()[1];

    assert_eq!(ask.side, QuoteSide::Ask);
    assert_eq!(ask.price, 0.00001945);
    assert_eq!(ask.price_including_spread, 0.00001955);
    assert_eq!(ask.spread, 0.00514139);
}

#[test]
fn test_quote_ignores_other_sides_spread_fields() {
    // A bid that also carries buy-spread keys still reads the sell-spread ones.
    let bid = EstimatedOrderPrice::from_payload(&json!({
        "symbol": "BTC-USD",
        "price": "100",
        "quantity": "1",
        "side": "bid",
        "bid_inclusive_of_sell_spread": "99",
        "sell_spread": "0.01",
        "ask_inclusive_of_buy_spread": "101",
        "buy_spread": "0.02",
        "timestamp": "2024-11-09T06:16:50Z"
    }))
    .unwrap();

    assert_eq!(bid.price_including_spread, 99.0);
    assert_eq!(bid.spread, 0.01);
}

#[test]
fn test_quote_timestamp_keeps_offset_and_nanoseconds() {
    let bid = &quotes()[0];

    assert_eq!(bid.timestamp, at("2024-11-09T06:16:50.104485455-05:00"));
    assert_eq!(bid.timestamp.offset().local_minus_utc(), -5 * 3600);
    assert_eq!(bid.timestamp.timestamp_subsec_nanos(), 104_485_455);
}

#[test]
fn test_bid_and_ask_with_equal_timestamps_pair_up() {
    let mut quotes = quotes();
    let ask = quotes.pop().unwrap();
    let bid = quotes.pop().unwrap();

    let pair = EstimatedBidAndAskPrice::new(bid.clone(), ask.clone()).unwrap();

    assert_eq!(pair.timestamp, bid.timestamp);
    assert_eq!(pair.timestamp, ask.timestamp);
    assert_eq!(pair.bid, bid);
    assert_eq!(pair.ask, ask);
}

#[test]
fn test_same_instant_in_different_offsets_matches() {
    let mut quotes = quotes();
    let mut ask = quotes.pop().unwrap();
    let bid = quotes.pop().unwrap();
    ask.timestamp = at("2024-11-09T11:16:50.104485455+00:00");

    assert!(EstimatedBidAndAskPrice::new(bid, ask).is_ok());
}

#[test]
fn test_bid_and_ask_with_different_timestamps_fail() {
    let mut quotes = quotes();
    let mut ask = quotes.pop().unwrap();
    let bid = quotes.pop().unwrap();
    ask.timestamp = at("2024-11-09T06:16:50.104485456-05:00");

    let err = EstimatedBidAndAskPrice::new(bid, ask).unwrap_err();
    assert!(matches!(err, SpreadlogError::TimestampMismatch { .. }));
}

#[test]
fn test_swapped_sides_are_rejected() {
    let mut quotes = quotes();
    let ask = quotes.pop().unwrap();
    let bid = quotes.pop().unwrap();

    let err = EstimatedBidAndAskPrice::new(ask, bid).unwrap_err();
    assert!(matches!(err, SpreadlogError::MalformedResponse(_)));
}

#[test]
fn test_bid_and_ask_payload_deserializes() {
    let payload: Value = serde_json::from_str(ESTIMATED_BOTH_JSON).unwrap();
    let results = payload["results"].as_array().unwrap();

    let pair = EstimatedBidAndAskPrice::from_payload(&json!({
        "bid": results[0],
        "ask": results[1],
    }))
    .unwrap();

    assert_eq!(pair.bid.price, 0.00001943);
    assert_eq!(pair.ask.price, 0.00001945);
}

#[test]
fn test_history_entry_flattens_both_quotes() {
    let mut quotes = quotes();
    let ask = quotes.pop().unwrap();
    let bid = quotes.pop().unwrap();

    let entry = EstimatedOrderPriceHistoryEntry::from_quotes(bid.clone(), ask.clone()).unwrap();

    assert_eq!(entry.symbol, "SHIB-USD");
    assert_eq!(entry.bid_price, bid.price);
    assert_eq!(entry.bid_quantity, bid.quantity);
    assert_eq!(entry.bid_side, QuoteSide::Bid);
    assert_eq!(entry.bid_timestamp, bid.timestamp);
    assert_eq!(entry.bid_price_including_spread, bid.price_including_spread);
    assert_eq!(entry.bid_spread, bid.spread);
    assert_eq!(entry.ask_price, ask.price);
    assert_eq!(entry.ask_quantity, ask.quantity);
    assert_eq!(entry.ask_side, QuoteSide::Ask);
    assert_eq!(entry.ask_timestamp, ask.timestamp);
    assert_eq!(entry.ask_price_including_spread, ask.price_including_spread);
    assert_eq!(entry.ask_spread, ask.spread);
    assert_eq!(entry.timestamp, bid.timestamp);

    let nested = entry.to_bid_and_ask();
    assert_eq!(nested.bid, bid);
    assert_eq!(nested.ask, ask);
}

#[test]
fn test_history_entry_rejects_mismatched_timestamps() {
    let mut quotes = quotes();
    let mut ask = quotes.pop().unwrap();
    let bid = quotes.pop().unwrap();
    ask.timestamp = at("2024-11-09T06:17:00-05:00");

    let err = EstimatedOrderPriceHistoryEntry::from_quotes(bid, ask).unwrap_err();
    assert!(matches!(err, SpreadlogError::TimestampMismatch { .. }));
}

#[test]
fn test_history_entry_survives_storage_serialization() {
    let mut quotes = quotes();
    let ask = quotes.pop().unwrap();
    let bid = quotes.pop().unwrap();
    let entry = EstimatedOrderPriceHistoryEntry::from_quotes(bid, ask).unwrap();

    let stored = serde_json::to_value(&entry).unwrap();
    assert_eq!(stored["bid_side"], "bid");
    assert_eq!(stored["ask_side"], "ask");
    assert!(stored.get("bid").is_none(), "entry must be flat");

    let restored: EstimatedOrderPriceHistoryEntry = serde_json::from_value(stored).unwrap();
    assert_eq!(restored.symbol, entry.symbol);
    assert_eq!(restored.timestamp, entry.timestamp);
    assert_eq!(restored.bid_timestamp, entry.bid_timestamp);
    assert_eq!(restored.ask_timestamp, entry.ask_timestamp);
    assert!(close(restored.bid_price, entry.bid_price));
    assert!(close(restored.ask_price_including_spread, entry.ask_price_including_spread));
    assert!(close(restored.ask_spread, entry.ask_spread));
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= f64::EPSILON * b.abs().max(1.0)
}
