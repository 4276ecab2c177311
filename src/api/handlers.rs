//! API Handlers
//!
//! HTTP request handlers for each aggregator endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::aggregator::{Aggregator, AggregatorSettings};
use crate::cache::EntityCache;
use crate::config::Config;
use crate::error::{AggregatorError, Result};
use crate::models::{Entity, HealthResponse, ItemId, ListingQuery, ListingResponse, StatsResponse};
use crate::upstream::{Feed, Upstream};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }

    /// Wires a fresh cache and the orchestrator around `upstream`.
    pub fn from_config(config: &Config, upstream: Arc<dyn Upstream>) -> Self {
        let settings = AggregatorSettings::from(config);
        Self::new(Aggregator::new(upstream, EntityCache::new(), settings))
    }

    pub fn cache(&self) -> &EntityCache {
        self.aggregator.cache()
    }
}

/// Handler for GET /api/topstories
pub async fn top_stories_handler(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResponse>> {
    let listing = state
        .aggregator
        .listing(Feed::Top, &query.page_request())
        .await?;
    Ok(Json(listing))
}

/// Handler for GET /api/stories/:feed
pub async fn feed_handler(
    State(state): State<AppState>,
    Path(feed): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResponse>> {
    let feed: Feed = feed.parse().map_err(AggregatorError::InvalidRequest)?;
    let listing = state
        .aggregator
        .listing(feed, &query.page_request())
        .await?;
    Ok(Json(listing))
}

/// Handler for GET /api/item/:id
pub async fn item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Entity>> {
    let id: ItemId = id
        .parse()
        .map_err(|_| AggregatorError::InvalidRequest("invalid id".to_string()))?;
    Ok(Json(state.aggregator.item(id).await?))
}

/// Handler for GET /api/user/:name
pub async fn user_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Entity>> {
    Ok(Json(state.aggregator.user(&name).await?))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache().stats().await;

    Json(StatsResponse::new(
        stats.hits,
        stats.misses,
        stats.expirations,
        stats.total_entries,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
