//! # Pagination
//!
//! Page/limit handling for the order history read path. Out-of-range input
//! falls back to the defaults instead of failing.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// A normalized page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    page: i64,
    limit: i64,
}

impl Pagination {
    /// Non-positive values fall back to the defaults; `limit` is capped at
    /// [`MAX_LIMIT`].
    pub fn new(page: i64, limit: i64) -> Self {
        let page = if page > 0 { page } else { DEFAULT_PAGE };
        let limit = if limit > 0 { limit.min(MAX_LIMIT) } else { DEFAULT_LIMIT };
        Pagination { page, limit }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: i64,
    pub limit: i64,
    /// Total rows across all pages.
    pub total: i64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(pagination: Pagination, total: i64, data: Vec<T>) -> Self {
        Page {
            page: pagination.page(),
            limit: pagination.limit(),
            total,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::default();
        assert_eq!((p.page(), p.limit(), p.offset()), (1, 10, 0));
    }

    #[test]
    fn test_invalid_input_falls_back() {
        let p = Pagination::new(0, -3);
        assert_eq!((p.page(), p.limit()), (DEFAULT_PAGE, DEFAULT_LIMIT));
    }

    #[test]
    fn test_limit_is_capped() {
        assert_eq!(Pagination::new(1, 10_000).limit(), MAX_LIMIT);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::new(3, 20).offset(), 40);
    }
}
