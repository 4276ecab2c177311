//! Request Orchestrator
//!
//! Per-request entry points: listings go through ID-list retrieval, fan-out
//! and assembly under one time budget; single items and users are a
//! read-through cache lookup with a shorter budget and no admission gate.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::assembler;
use crate::cache::{item_key, user_key, EntityCache};
use crate::config::{Config, ListingMode};
use crate::error::{AggregatorError, Result, UpstreamError};
use crate::fetcher::{BatchPlan, FanOutFetcher};
use crate::models::{Entity, ItemId, ListingResponse, PageRequest};
use crate::upstream::{within, Feed, Upstream};

// == Settings ==
/// Time budgets, TTLs and policy used by the orchestrator.
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub listing_budget: Duration,
    pub entity_budget: Duration,
    pub item_ttl: Duration,
    pub user_ttl: Duration,
    pub max_concurrency: usize,
    pub mode: ListingMode,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AggregatorSettings {
    fn from(config: &Config) -> Self {
        Self {
            listing_budget: config.listing_budget(),
            entity_budget: config.entity_budget(),
            item_ttl: Duration::from_secs(config.item_ttl),
            user_ttl: Duration::from_secs(config.user_ttl),
            max_concurrency: config.max_concurrent_fetches,
            mode: config.listing_mode,
        }
    }
}

impl AggregatorSettings {
    pub fn with_mode(mut self, mode: ListingMode) -> Self {
        self.mode = mode;
        self
    }
}

// == Aggregator ==
pub struct Aggregator {
    upstream: Arc<dyn Upstream>,
    cache: EntityCache,
    fetcher: FanOutFetcher,
    settings: AggregatorSettings,
}

impl Aggregator {
    pub fn new(upstream: Arc<dyn Upstream>, cache: EntityCache, settings: AggregatorSettings) -> Self {
        let fetcher = FanOutFetcher::new(Arc::clone(&upstream), cache.clone(), settings.max_concurrency);
        Self {
            upstream,
            cache,
            fetcher,
            settings,
        }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    // == Listing ==
    /// Builds one page of a feed.
    ///
    /// Failure to obtain the ID list is the only error; items that cannot
    /// be resolved are left out of the page.
    #[instrument(skip(self), fields(mode = ?self.settings.mode))]
    pub async fn listing(&self, feed: Feed, page: &PageRequest) -> Result<ListingResponse> {
        let deadline = Instant::now() + self.settings.listing_budget;

        let ids = within(deadline, self.upstream.fetch_id_list(feed))
            .await
            .map_err(|err| {
                warn!(error = %err, "ID list unavailable");
                AggregatorError::upstream(format!("failed fetch {}stories", feed), err)
            })?;

        let plan = BatchPlan {
            key_of: item_key,
            ttl: self.settings.item_ttl,
            deadline,
        };

        let listing = match self.settings.mode {
            ListingMode::PageFirst => {
                if let Some(kind) = page.kind() {
                    debug!(kind, "Type filter ignored in page-first mode");
                }
                let page_ids = assembler::page_ids(&ids, page);
                let outcome = self.fetcher.fetch_all(page_ids, &plan).await;
                assembler::assemble_page(page_ids, outcome, ids.len())
            }
            ListingMode::FetchAll => {
                let outcome = self.fetcher.fetch_all(&ids, &plan).await;
                assembler::assemble_sorted(&ids, outcome, page)
            }
        };

        info!(
            listed = ids.len(),
            returned = listing.items.len(),
            total = listing.total,
            "Listing assembled"
        );
        Ok(listing)
    }

    // == Single Entities ==
    #[instrument(skip(self))]
    pub async fn item(&self, id: ItemId) -> Result<Entity> {
        self.read_through(
            item_key(id),
            self.settings.item_ttl,
            "failed fetch item",
            self.upstream.fetch_entity(id),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn user(&self, name: &str) -> Result<Entity> {
        if name.trim().is_empty() {
            return Err(AggregatorError::InvalidRequest("missing user".to_string()));
        }
        self.read_through(
            user_key(name),
            self.settings.user_ttl,
            "failed fetch user",
            self.upstream.fetch_user(name),
        )
        .await
    }

    /// Cache hit, or one upstream call under the entity budget.
    ///
    /// `fetch` is only polled on a miss.
    async fn read_through<F>(&self, key: String, ttl: Duration, context: &str, fetch: F) -> Result<Entity>
    where
        F: Future<Output = std::result::Result<Entity, UpstreamError>>,
    {
        if let Some(entity) = self.cache.get(&key).await {
            debug!(key = %key, "Cache hit");
            return Ok(entity);
        }
        debug!(key = %key, "Cache miss");

        let deadline = Instant::now() + self.settings.entity_budget;
        let entity = within(deadline, fetch).await.map_err(|err| {
            warn!(key = %key, error = %err, "Upstream fetch failed");
            AggregatorError::upstream(context, err)
        })?;

        self.cache.set(key, entity.clone(), ttl).await;
        Ok(entity)
    }
}
