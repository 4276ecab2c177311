//! Cache Module
//!
//! Provides the process-wide entity cache with per-entry TTL and lazy expiry.
//! Items and users share one store under disjoint key prefixes.

mod entry;
mod stats;
mod store;


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::models::{Entity, ItemId};

// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Key Naming ==
/// Cache key of an item: `item:{id}`.
pub fn item_key(id: ItemId) -> String {
    format!("item:{}", id)
}

/// Cache key of a user profile: `user:{name}`.
pub fn user_key(name: &str) -> String {
    format!("user:{}", name)
}

// == Entity Cache ==
/// Shared handle to the entity store.
///
/// Cloning is cheap and every clone sees the same entries. Individual
/// `get`/`set` calls are atomic; sequences of them are not.
#[derive(Clone, Default)]
pub struct EntityCache {
    inner: Arc<RwLock<CacheStore<Entity>>>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached entity, or `None` if absent or expired.
    pub async fn get(&self, key: &str) -> Option<Entity> {
        // Write lock: a read may drop an expired entry and updates stats
        self.inner.write().await.get(key)
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub async fn set(&self, key: impl Into<String>, value: Entity, ttl: Duration) {
        self.inner.write().await.set(key, value, ttl);
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    /// Sweeps expired entries, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.inner.write().await.cleanup_expired()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
