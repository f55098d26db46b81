//! Price history recording and reading.
//!
//! [`PriceHistoryStore`] is the boundary to whatever document store keeps
//! the flattened entries. [`collect_current_prices`] records one snapshot
//! per symbol and [`group_by_symbol`] regroups stored entries for analysis.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::client::PriceClient;
use crate::models::EstimatedOrderPriceHistoryEntry;

/// Insert and query operations over stored price history entries.
pub trait PriceHistoryStore: Send + Sync {
    fn insert_one<'a>(&'a self, entry: EstimatedOrderPriceHistoryEntry)
    -> BoxFuture<'a, crate::Result<()>>;

    fn find_all(&self) -> BoxFuture<'_, crate::Result<Vec<EstimatedOrderPriceHistoryEntry>>>;

    fn find_by_symbol<'a>(
        &'a self,
        symbol: &'a str,
    ) -> BoxFuture<'a, crate::Result<Vec<EstimatedOrderPriceHistoryEntry>>>;

    /// Removes every entry and returns how many were removed.
    fn clear(&self) -> BoxFuture<'_, crate::Result<usize>>;
}

/// Process-local store, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceHistory {
    entries: Arc<RwLock<Vec<EstimatedOrderPriceHistoryEntry>>>,
}

impl InMemoryPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl PriceHistoryStore for InMemoryPriceHistory {
    fn insert_one<'a>(
        &'a self,
        entry: EstimatedOrderPriceHistoryEntry,
    ) -> BoxFuture<'a, crate::Result<()>> {
        Box::pin(async move {
            self.entries.write().await.push(entry);
            Ok(())
        })
    }

    fn find_all(&self) -> BoxFuture<'_, crate::Result<Vec<EstimatedOrderPriceHistoryEntry>>> {
        Box::pin(async move { Ok(self.entries.read().await.clone()) })
    }

    fn find_by_symbol<'a>(
        &'a self,
        symbol: &'a str,
    ) -> BoxFuture<'a, crate::Result<Vec<EstimatedOrderPriceHistoryEntry>>> {
        Box::pin(async move {
            Ok(self
                .entries
                .read()
                .await
                .iter()
                .filter(|entry| entry.symbol == symbol)
                .cloned()
                .collect())
        })
    }

    fn clear(&self) -> BoxFuture<'_, crate::Result<usize>> {
        Box::pin(async move {
            let mut entries = self.entries.write().await;
            let removed = entries.len();
            entries.clear();
            Ok(removed)
        })
    }
}

/// Fetches the current estimated price of each symbol and stores it.
///
/// A symbol whose fetch or insert fails is logged and skipped; the entries
/// that were stored are returned in symbol order.
pub async fn collect_current_prices<S: AsRef<str>>(
    client: &PriceClient,
    store: &dyn PriceHistoryStore,
    symbols: &[S],
) -> Vec<EstimatedOrderPriceHistoryEntry> {
    let mut recorded = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        let symbol = symbol.as_ref();
        let entry = match client.get_current_estimated_price(symbol).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                warn!(symbol, "No current estimated price, request failed");
                continue;
            }
            Err(e) => {
                warn!(symbol, error = %e, "Rejected current estimated price");
                continue;
            }
        };

        if let Err(e) = store.insert_one(entry.clone()).await {
            warn!(symbol, error = %e, "Failed to store price history entry");
            continue;
        }

        info!(
            symbol,
            bid = entry.bid_price,
            ask = entry.ask_price,
            bid_including_spread = entry.bid_price_including_spread,
            ask_including_spread = entry.ask_price_including_spread,
            timestamp = %entry.timestamp,
            "Recorded current estimated price"
        );
        recorded.push(entry);
    }

    recorded
}

/// Groups entries by symbol, keeping their relative order.
pub fn group_by_symbol(
    entries: impl IntoIterator<Item = EstimatedOrderPriceHistoryEntry>,
) -> BTreeMap<String, Vec<EstimatedOrderPriceHistoryEntry>> {
    let mut grouped: BTreeMap<String, Vec<EstimatedOrderPriceHistoryEntry>> = BTreeMap::new();
    for entry in entries {
        grouped.entry(entry.symbol.clone()).or_default().push(entry);
    }
    grouped
}

/// Reads the whole store grouped by symbol.
///
/// # Errors
///
/// Returns whatever error the store reports.
pub async fn read_price_history(
    store: &dyn PriceHistoryStore,
) -> crate::Result<BTreeMap<String, Vec<EstimatedOrderPriceHistoryEntry>>> {
    Ok(group_by_symbol(store.find_all().await?))
}
