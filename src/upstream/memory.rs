//! In-memory upstream.
//!
//! Serves canned feeds, items and users. Failures and latency can be
//! injected per item, and every call is counted, including the peak number
//! of item fetches in flight at once.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::models::{Entity, ItemId};
use crate::upstream::{Feed, Upstream};

#[derive(Debug, Default)]
struct Counters {
    id_list_calls: AtomicUsize,
    entity_calls: AtomicUsize,
    user_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Decrements the in-flight gauge when a fetch ends, however it ends.
struct InFlight<'a>(&'a Counters);

impl<'a> InFlight<'a> {
    fn enter(counters: &'a Counters) -> Self {
        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(counters)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Upstream backed by in-process maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryUpstream {
    feeds: HashMap<Feed, Vec<ItemId>>,
    items: HashMap<ItemId, Entity>,
    users: HashMap<String, Entity>,
    failing: HashSet<ItemId>,
    feeds_down: bool,
    latency: Duration,
    counters: Arc<Counters>,
}

impl MemoryUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ID listing served for `feed`.
    pub fn with_feed(mut self, feed: Feed, ids: impl IntoIterator<Item = ItemId>) -> Self {
        self.feeds.insert(feed, ids.into_iter().collect());
        self
    }

    /// Adds an item, keyed by its `id` field.
    ///
    /// Entities without an integer `id` are ignored.
    pub fn with_item(mut self, entity: Entity) -> Self {
        if let Some(id) = entity.id() {
            self.items.insert(id, entity);
        }
        self
    }

    pub fn with_items(self, entities: impl IntoIterator<Item = Entity>) -> Self {
        entities.into_iter().fold(self, Self::with_item)
    }

    /// Adds a user profile, keyed by its `id` field (the username).
    pub fn with_user(mut self, entity: Entity) -> Self {
        if let Some(name) = entity.get_string("id").map(str::to_string) {
            self.users.insert(name, entity);
        }
        self
    }

    /// Makes fetches of `id` fail with a server error.
    pub fn failing(mut self, id: ItemId) -> Self {
        self.failing.insert(id);
        self
    }

    /// Makes every ID listing request fail.
    pub fn feeds_unavailable(mut self) -> Self {
        self.feeds_down = true;
        self
    }

    /// Delays every item and user fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn id_list_calls(&self) -> usize {
        self.counters.id_list_calls.load(Ordering::SeqCst)
    }

    pub fn entity_calls(&self) -> usize {
        self.counters.entity_calls.load(Ordering::SeqCst)
    }

    pub fn user_calls(&self) -> usize {
        self.counters.user_calls.load(Ordering::SeqCst)
    }

    /// Highest number of item fetches observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn not_found() -> UpstreamError {
    UpstreamError::Decode("invalid type: null, expected a map".to_string())
}

#[async_trait]
impl Upstream for MemoryUpstream {
    async fn fetch_id_list(&self, feed: Feed) -> Result<Vec<ItemId>, UpstreamError> {
        self.counters.id_list_calls.fetch_add(1, Ordering::SeqCst);
        if self.feeds_down {
            return Err(UpstreamError::Status {
                status: 503,
                body: "feed unavailable".to_string(),
            });
        }
        Ok(self.feeds.get(&feed).cloned().unwrap_or_default())
    }

    async fn fetch_entity(&self, id: ItemId) -> Result<Entity, UpstreamError> {
        self.counters.entity_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(&self.counters);
        self.pause().await;

        if self.failing.contains(&id) {
            return Err(UpstreamError::Status {
                status: 500,
                body: format!("injected failure for item {}", id),
            });
        }
        self.items.get(&id).cloned().ok_or_else(not_found)
    }

    async fn fetch_user(&self, name: &str) -> Result<Entity, UpstreamError> {
        self.counters.user_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.users.get(name).cloned().ok_or_else(not_found)
    }
}
