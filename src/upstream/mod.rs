//! Upstream Module
//!
//! The remote item API as seen by the aggregator: a source of ID listings,
//! items and user profiles.
//!
//! # Implementations
//! - `HnClient` - HTTP client for the Hacker News v0 API
//! - `MemoryUpstream` - in-process canned data, for tests and local development

mod hn;
mod memory;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::UpstreamError;
use crate::models::{Entity, ItemId};

pub use hn::HnClient;
pub use memory::MemoryUpstream;

// == Feed ==
/// One of the ID listings published by the upstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Feed {
    #[default]
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
}

impl Feed {
    pub const ALL: [Feed; 6] = [
        Feed::Top,
        Feed::New,
        Feed::Best,
        Feed::Ask,
        Feed::Show,
        Feed::Job,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Top => "top",
            Feed::New => "new",
            Feed::Best => "best",
            Feed::Ask => "ask",
            Feed::Show => "show",
            Feed::Job => "job",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feed {
    type Err = String;

    /// Accepts both `top` and `topstories` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix("stories").unwrap_or(s);
        Feed::ALL
            .into_iter()
            .find(|feed| feed.as_str() == name)
            .ok_or_else(|| format!("unknown feed '{}'", s))
    }
}

// == Upstream Trait ==
/// Interface to the remote item API.
///
/// Implementations do not need to enforce deadlines themselves: every call
/// made by the aggregator goes through [`within`].
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetches the ordered ID listing of a feed.
    async fn fetch_id_list(&self, feed: Feed) -> Result<Vec<ItemId>, UpstreamError>;

    /// Fetches a single item.
    async fn fetch_entity(&self, id: ItemId) -> Result<Entity, UpstreamError>;

    /// Fetches a user profile by name.
    async fn fetch_user(&self, name: &str) -> Result<Entity, UpstreamError>;
}

/// Runs an upstream call under `deadline`.
///
/// On expiry the call's future is dropped, cancelling any in-flight request.
pub async fn within<T, F>(deadline: Instant, call: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    tokio::time::timeout_at(deadline, call)
        .await
        .unwrap_or(Err(UpstreamError::Timeout))
}
