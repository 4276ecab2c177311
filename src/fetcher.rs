//! Bounded Fan-Out Fetcher
//!
//! Resolves a batch of item ids to entities concurrently. Each id becomes an
//! independent task that consults the cache first and only on a miss goes
//! to the upstream, after passing an admission gate that caps the number of
//! simultaneous upstream calls for the batch.
//!
//! Failed ids are dropped from the outcome, never retried, and never abort
//! the batch. The call returns once every task has finished.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn, Instrument};

use crate::cache::EntityCache;
use crate::error::UpstreamError;
use crate::models::{Entity, ItemId};
use crate::upstream::{within, Upstream};

/// Admission limit used when none is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Entities resolved by one batch, paired with their id, in completion order.
pub type OutcomeSet = Vec<(ItemId, Entity)>;

/// Per-batch parameters.
#[derive(Debug, Clone, Copy)]
pub struct BatchPlan {
    /// Cache key of an id
    pub key_of: fn(ItemId) -> String,
    /// TTL of freshly fetched entities
    pub ttl: Duration,
    /// Shared deadline of every upstream call in the batch
    pub deadline: Instant,
}

// == Fan-Out Fetcher ==
#[derive(Clone)]
pub struct FanOutFetcher {
    upstream: Arc<dyn Upstream>,
    cache: EntityCache,
    max_concurrency: usize,
}

impl FanOutFetcher {
    /// Creates a fetcher; a `max_concurrency` of 0 is raised to 1.
    pub fn new(upstream: Arc<dyn Upstream>, cache: EntityCache, max_concurrency: usize) -> Self {
        Self {
            upstream,
            cache,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Resolves every distinct id in `ids`.
    ///
    /// Repeated ids are scheduled once. The returned set holds only the
    /// entities that were found in the cache or fetched successfully.
    pub async fn fetch_all(&self, ids: &[ItemId], plan: &BatchPlan) -> OutcomeSet {
        let gate = Arc::new(Semaphore::new(self.max_concurrency));
        let mut scheduled = HashSet::with_capacity(ids.len());
        let mut units = JoinSet::new();

        for &id in ids {
            if !scheduled.insert(id) {
                continue;
            }
            let unit = resolve_one(
                id,
                Arc::clone(&self.upstream),
                self.cache.clone(),
                Arc::clone(&gate),
                *plan,
            );
            units.spawn(unit.in_current_span());
        }

        // Single collector: each unit hands back its own outcome
        let mut outcome = Vec::with_capacity(scheduled.len());
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(Some(resolved)) => outcome.push(resolved),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "Fetch unit did not complete"),
            }
        }

        debug!(
            requested = scheduled.len(),
            resolved = outcome.len(),
            "Fan-out batch finished"
        );
        outcome
    }
}

/// Cache-or-fetch for a single id.
async fn resolve_one(
    id: ItemId,
    upstream: Arc<dyn Upstream>,
    cache: EntityCache,
    gate: Arc<Semaphore>,
    plan: BatchPlan,
) -> Option<(ItemId, Entity)> {
    let key = (plan.key_of)(id);
    if let Some(entity) = cache.get(&key).await {
        return Some((id, entity));
    }

    let fetched = within(plan.deadline, async {
        // Permit is held for the upstream call only and released on drop
        let _permit = gate
            .acquire()
            .await
            .map_err(|_| UpstreamError::Transport("admission gate closed".to_string()))?;
        upstream.fetch_entity(id).await
    })
    .await;

    match fetched {
        Ok(entity) => {
            cache.set(key, entity.clone(), plan.ttl).await;
            Some((id, entity))
        }
        Err(err) => {
            warn!(id, error = %err, "Dropping item from batch");
            None
        }
    }
}
