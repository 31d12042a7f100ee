//! Pagination of fully materialized result lists.
//!
//! Pages are 1-based. The first page always exists, even for an empty list;
//! any other page past the end is `PageNotFound`.

use serde::Serialize;

use crate::{Error, Result};

/// One page plus the metadata clients use to navigate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub objects: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    /// Echo of the query, when the operation has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<serde_json::Value>,
    pub page: usize,
    pub limit: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    limit: usize,
}

impl Paginator {
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::InvalidParameter {
                name: "limit".into(),
                reason: "must be a positive integer".into(),
            });
        }
        Ok(Self { limit })
    }

    /// Number of pages for `total` items (at least one).
    pub fn num_pages(&self, total: usize) -> usize {
        total.div_ceil(self.limit).max(1)
    }

    /// Slice out page `page` of `items`.
    pub fn page<T>(&self, items: Vec<T>, page: usize, q: Option<serde_json::Value>) -> Result<Page<T>> {
        let total = items.len();
        let pages = self.num_pages(total);
        if page == 0 || page > pages {
            return Err(Error::PageNotFound { page, pages });
        }
        let objects = items
            .into_iter()
            .skip((page - 1) * self.limit)
            .take(self.limit)
            .collect();
        Ok(Page {
            objects,
            meta: PageMeta { q, page, limit: self.limit, total_count: total },
        })
    }
}
