//! Request DTOs for the aggregator API
//!
//! Defines the query parameters of listing requests and the clamped page
//! request derived from them.

use serde::Deserialize;

/// Page used when the requested one is missing or below 1.
pub const DEFAULT_PAGE: usize = 1;
/// Page size used when the requested one is missing or outside the allowed range.
pub const DEFAULT_LIMIT: usize = 20;
/// Largest accepted page size.
pub const MAX_LIMIT: usize = 100;

/// Query string of listing endpoints (`?page=&limit=&type=`).
///
/// Values are kept as raw strings so malformed numbers fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    /// Equality filter on the entity `type` field
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ListingQuery {
    /// Converts the raw query into a clamped page request.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            parse_lenient(self.page.as_deref()),
            parse_lenient(self.limit.as_deref()),
            self.kind.clone(),
        )
    }
}

/// Unparseable numbers read as 0, which the clamp law then replaces.
fn parse_lenient(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

// == Page Request ==
/// A validated pagination window plus optional type filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
    kind: Option<String>,
}

impl PageRequest {
    /// Builds a page request, clamping out-of-range input.
    ///
    /// `page < 1` becomes 1; `limit < 1` or `limit > 100` becomes 20.
    /// An empty type filter is treated as absent.
    pub fn new(page: i64, limit: i64, kind: Option<String>) -> Self {
        let page = if page < 1 { DEFAULT_PAGE } else { page as usize };
        let limit = if limit < 1 || limit > MAX_LIMIT as i64 {
            DEFAULT_LIMIT
        } else {
            limit as usize
        };
        let kind = kind.filter(|k| !k.is_empty());
        Self { page, limit, kind }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Index of the first element of this page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Half-open index range of this page within `total` elements.
    ///
    /// Empty when the offset lies at or beyond `total`.
    pub fn window(&self, total: usize) -> std::ops::Range<usize> {
        let start = self.offset();
        if start >= total {
            return total..total;
        }
        let end = start.saturating_add(self.limit).min(total);
        start..end
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE as i64, DEFAULT_LIMIT as i64, None)
    }
}
