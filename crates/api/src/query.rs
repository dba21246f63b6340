//! Shared query parameter types for API handlers.

use serde::Deserialize;
use yamdb_core::pagination::PageRequest;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped to the default/maximum page size by [`PageRequest`].
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.offset)
    }
}

/// Pagination plus a `?search=` substring filter.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.offset)
    }

    /// The search term, with blank input treated as absent.
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
