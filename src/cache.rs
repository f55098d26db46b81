//! Time-bounded memoization for slow-changing reference data.
//!
//! Entries expire a fixed interval after insertion. The store is
//! process-local and shared behind an `Arc<RwLock<_>>`; two callers missing
//! the same key at the same time may both compute the value, and the last
//! writer wins.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    /// `None` when the TTL is too large to represent as an instant.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

/// Thread-safe in-memory cache with a single TTL for every entry.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    inner: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            ttl: self.ttl,
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the cached value if present and not yet expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// Stores `value` under `key`, replacing any previous entry, and drops
    /// every entry that has already expired.
    ///
    /// A zero TTL disables the cache and makes this a no-op.
    pub async fn insert(&self, key: K, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        let expires_at = now.checked_add(self.ttl);

        let mut map = self.inner.write().await;
        map.retain(|_, entry| entry.is_live(now));
        map.insert(key, CacheEntry { value, expires_at });
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its
    /// `Ok(Some(_))` result.
    ///
    /// `Ok(None)` and `Err(_)` outcomes are passed through uncached so the
    /// next caller tries again.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, fetch: F) -> Result<Option<V>, E>
    where
        K: fmt::Debug,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!(?key, "Cache hit");
            return Ok(Some(value));
        }
        debug!(?key, "Cache miss");

        let fetched = fetch().await?;
        if let Some(value) = &fetched {
            self.insert(key, value.clone()).await;
        }
        Ok(fetched)
    }

    /// Removes expired entries.
    pub async fn clear_expired(&self) {
        let now = Instant::now();
        self.inner
            .write()
            .await
            .retain(|_, entry| entry.is_live(now));
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
