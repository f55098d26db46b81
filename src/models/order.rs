//! Order placement models.
//!
//! The order body names its configuration object after the order type
//! (`market_order_config`, `limit_order_config`, ...), so
//! [`PlaceOrderRequest`] serializes itself by hand.

use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order type specifying how the order should be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    StopLoss,
    StopLimit,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
            OrderType::StopLoss => "stop_loss",
            OrderType::StopLimit => "stop_limit",
        }
    }

    /// Body key holding this type's configuration.
    pub fn config_key(self) -> String {
        format!("{}_order_config", self.as_str())
    }
}

/// Time in force for limit and stop orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Good 'til cancelled.
    Gtc,
    /// Good for day.
    Gfd,
    /// Good for week.
    Gfw,
    /// Good for month.
    Gfm,
}

/// Per-type order configuration. Unset fields are omitted from the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
}

impl OrderConfig {
    /// Market order for a quantity of the asset.
    #[must_use]
    pub fn market(asset_quantity: Decimal) -> Self {
        Self {
            asset_quantity: Some(asset_quantity),
            ..Self::default()
        }
    }

    /// Good-'til-cancelled limit order for a quantity of the asset.
    #[must_use]
    pub fn limit(asset_quantity: Decimal, limit_price: Decimal) -> Self {
        Self {
            asset_quantity: Some(asset_quantity),
            limit_price: Some(limit_price),
            time_in_force: Some(TimeInForce::Gtc),
            ..Self::default()
        }
    }
}

/// Body of `POST /api/v1/crypto/trading/orders/`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrderRequest {
    pub client_order_id: Uuid,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub symbol: String,
    pub order_config: OrderConfig,
}

impl Serialize for PlaceOrderRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("client_order_id", &self.client_order_id)?;
        map.serialize_entry("side", &self.side)?;
        map.serialize_entry("type", &self.order_type)?;
        map.serialize_entry("symbol", &self.symbol)?;
        map.serialize_entry(&self.order_type.config_key(), &self.order_config)?;
        map.end()
    }
}

/// Fresh idempotency key for [`PlaceOrderRequest::client_order_id`].
pub fn new_client_order_id() -> Uuid {
    Uuid::new_v4()
}
