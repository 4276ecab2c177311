//! HN Aggregator - A read-through caching aggregator for the Hacker News API
//!
//! Fans out bounded concurrent item fetches, caches entities with TTLs and
//! serves paginated, optionally filtered listings.

pub mod aggregator;
pub mod api;
pub mod assembler;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use aggregator::{Aggregator, AggregatorSettings};
pub use api::AppState;
pub use config::{Config, ListingMode};
pub use tasks::spawn_cleanup_task;
