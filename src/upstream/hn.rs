//! Hacker News API client.
//!
//! Talks to the Firebase-backed v0 endpoints:
//! `/{feed}stories.json`, `/item/{id}.json`, `/user/{name}.json`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::UpstreamError;
use crate::models::{Entity, ItemId};
use crate::upstream::{Feed, Upstream};

/// HTTP client for the upstream item API.
#[derive(Debug, Clone)]
pub struct HnClient {
    base_url: Url,
    http_client: reqwest::Client,
}

impl HnClient {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let base_url = base_url.into();
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| UpstreamError::Transport(format!("invalid base url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Transport(format!("invalid base url {}", base_url)));
        }
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends `segments` to the base path, percent-encoding each one so a
    /// segment can never contribute `/`, `?` or `#` to the URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Fetches `url` and decodes the JSON body into `T`.
    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
        let response = self
            .http_client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        debug!(url = %url, bytes = bytes.len(), "Fetched upstream payload");
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Upstream for HnClient {
    #[instrument(skip(self))]
    async fn fetch_id_list(&self, feed: Feed) -> Result<Vec<ItemId>, UpstreamError> {
        let file = format!("{}stories.json", feed);
        self.fetch_json(self.endpoint(&[&file])).await
    }

    #[instrument(skip(self))]
    async fn fetch_entity(&self, id: ItemId) -> Result<Entity, UpstreamError> {
        // Unknown ids come back as `null`, which fails to decode as an object
        let file = format!("{}.json", id);
        self.fetch_json(self.endpoint(&["item", &file])).await
    }

    #[instrument(skip(self))]
    async fn fetch_user(&self, name: &str) -> Result<Entity, UpstreamError> {
        let file = format!("{}.json", name);
        self.fetch_json(self.endpoint(&["user", &file])).await
    }
}
