//! Query Cache
//!
//! In-memory map from request identity to the last response, with
//! freshness tracking and explicit invalidation after mutations.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;

use crate::claims::ClaimId;

/// Identity of a cached request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full claim list
    Claims,
    /// Detail records for one claim
    Claim(ClaimId),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Claims => write!(f, "claims"),
            QueryKey::Claim(id) => write!(f, "claim:{}", id),
        }
    }
}

/// A cached response
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub fetched_at: DateTime<Utc>,
    /// Set by `invalidate`; a stale entry is never served
    pub stale: bool,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, stale_after: Duration, now: DateTime<Utc>) -> bool {
        !self.stale && now - self.fetched_at < stale_after
    }
}

/// Cache of query results keyed by `QueryKey`
pub struct QueryCache<T> {
    entries: RwLock<HashMap<QueryKey, CacheEntry<T>>>,
    stale_after: Duration,
}

impl<T: Clone> QueryCache<T> {
    /// Create a cache whose entries expire after `stale_after`
    pub fn new(stale_after: std::time::Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stale_after: Duration::from_std(stale_after).unwrap_or_else(|_| Duration::weeks(52 * 100)),
        }
    }

    /// Return the cached value if present and fresh
    pub async fn get_fresh(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.stale_after, Utc::now()))
            .map(|entry| entry.data.clone())
    }

    /// Store a value, replacing any previous entry for the key
    pub async fn put(&self, key: QueryKey, data: T) {
        let entry = CacheEntry {
            data,
            fetched_at: Utc::now(),
            stale: false,
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Mark one entry stale. Returns whether the key was cached.
    pub async fn invalidate(&self, key: &QueryKey) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.stale = true;
                tracing::debug!(key = %key, "Cache entry invalidated");
                true
            }
            None => false,
        }
    }

    /// Mark every entry stale
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        for entry in entries.values_mut() {
            entry.stale = true;
        }
        tracing::debug!(count = entries.len(), "Cache invalidated");
    }

    /// Snapshot of an entry, fresh or not
    pub async fn entry(&self, key: &QueryKey) -> Option<CacheEntry<T>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Number of cached keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
