//! Configuration Module
//!
//! Handles loading and managing aggregator configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::fetcher::DEFAULT_MAX_CONCURRENCY;

/// Default base URL of the upstream item API.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// How listing requests combine pagination with fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingMode {
    /// Slice the ID list first, fetch only the page
    #[default]
    PageFirst,
    /// Fetch every listed entity, filter by type, sort by time, then slice
    FetchAll,
}

impl FromStr for ListingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page_first" | "page-first" => Ok(ListingMode::PageFirst),
            "fetch_all" | "fetch-all" => Ok(ListingMode::FetchAll),
            other => Err(format!("unknown listing mode '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the upstream API
    pub upstream_base_url: String,
    /// Per-request timeout of the HTTP client in seconds
    pub upstream_timeout: u64,
    /// Time budget for a whole listing request in seconds
    pub listing_timeout: u64,
    /// Time budget for a single item/user request in seconds
    pub entity_timeout: u64,
    /// TTL of cached items in seconds
    pub item_ttl: u64,
    /// TTL of cached users in seconds
    pub user_ttl: u64,
    /// Maximum simultaneous upstream fetches per batch
    pub max_concurrent_fetches: usize,
    /// Background sweep interval in seconds (0 disables the sweep)
    pub cleanup_interval: u64,
    /// Listing pagination policy
    pub listing_mode: ListingMode,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `UPSTREAM_BASE_URL` - Upstream API root (default: HN v0)
    /// - `UPSTREAM_TIMEOUT` - HTTP client timeout in seconds (default: 10)
    /// - `LISTING_TIMEOUT` - Listing time budget in seconds (default: 20)
    /// - `ENTITY_TIMEOUT` - Single entity time budget in seconds (default: 5)
    /// - `ITEM_TTL` - Item cache TTL in seconds (default: 600)
    /// - `USER_TTL` - User cache TTL in seconds (default: 1800)
    /// - `MAX_CONCURRENT_FETCHES` - Fan-out admission limit (default: 10)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 600)
    /// - `LISTING_MODE` - `page_first` or `fetch_all` (default: page_first)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.upstream_base_url),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT", defaults.upstream_timeout),
            listing_timeout: env_or("LISTING_TIMEOUT", defaults.listing_timeout),
            entity_timeout: env_or("ENTITY_TIMEOUT", defaults.entity_timeout),
            item_ttl: env_or("ITEM_TTL", defaults.item_ttl),
            user_ttl: env_or("USER_TTL", defaults.user_ttl),
            max_concurrent_fetches: env_or("MAX_CONCURRENT_FETCHES", defaults.max_concurrent_fetches),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            listing_mode: env_or("LISTING_MODE", defaults.listing_mode),
        }
    }

    pub fn listing_budget(&self) -> Duration {
        Duration::from_secs(self.listing_timeout)
    }

    pub fn entity_budget(&self) -> Duration {
        Duration::from_secs(self.entity_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            upstream_timeout: 10,
            listing_timeout: 20,
            entity_timeout: 5,
            item_ttl: 600,
            user_ttl: 1800,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENCY,
            cleanup_interval: 600,
            listing_mode: ListingMode::PageFirst,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
