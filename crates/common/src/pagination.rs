//! Limit/offset pagination.

use serde::{Deserialize, Deserializer, Serialize};

/// Largest window bound the database accepts (`BIGINT`).
const MAX_BOUND: u64 = i64::MAX as u64;

/// `limit`/`offset` query parameters as sent by the client.
///
/// Values that are not non-negative integers are treated as absent rather
/// than rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LimitOffset {
    /// Maximum number of items to return.
    #[serde(default, deserialize_with = "lenient")]
    pub limit: Option<u64>,
    /// Index of the first item to return.
    #[serde(default, deserialize_with = "lenient")]
    pub offset: Option<u64>,
}

fn lenient<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| value.trim().parse::<u64>().ok()))
}

/// A resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page size, never zero and never above the configured maximum.
    pub limit: u64,
    /// Starting index.
    pub offset: u64,
}

impl LimitOffset {
    /// Resolve the client parameters into a page window.
    ///
    /// Returns `None` when the client did not ask for a page (no `limit`, or
    /// `limit=0`), in which case the whole collection is returned unpaginated.
    #[must_use]
    pub fn resolve(&self, max_limit: u64) -> Option<PageRequest> {
        let limit = self.limit.filter(|l| *l > 0)?;
        Some(PageRequest {
            limit: limit.min(max_limit.clamp(1, MAX_BOUND)),
            offset: self.offset.unwrap_or(0).min(MAX_BOUND),
        })
    }
}

/// A page of results together with the total count and navigation links.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    /// Total number of items in the collection.
    pub count: u64,
    /// Link to the next page, if any.
    pub next: Option<String>,
    /// Link to the previous page, if any.
    pub previous: Option<String>,
    /// Items in this page.
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    /// Build a page, deriving `next`/`previous` links from `path`.
    pub fn new(results: Vec<T>, count: u64, request: PageRequest, path: &str) -> Self {
        let PageRequest { limit, offset } = request;

        let next = (offset.saturating_add(limit) < count)
            .then(|| format!("{path}?limit={limit}&offset={}", offset + limit));

        let previous = (offset > 0).then(|| {
            if offset <= limit {
                format!("{path}?limit={limit}")
            } else {
                format!("{path}?limit={limit}&offset={}", offset - limit)
            }
        });

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}
