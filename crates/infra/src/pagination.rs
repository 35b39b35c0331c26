//! Page-number pagination for list queries.

use serde::{Deserialize, Serialize};

/// Requested page (1-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl Page {
    pub const MAX_PAGE_SIZE: u32 = 500;

    /// Normalize raw input: missing/zero values fall back to defaults,
    /// oversized pages are capped.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        let defaults = Self::default();
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(defaults.page),
            page_size: page_size
                .filter(|s| *s > 0)
                .unwrap_or(defaults.page_size)
                .min(Self::MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }

    pub fn limit(&self) -> usize {
        self.page_size as usize
    }

    /// Slice one page out of an already ordered result set.
    pub fn slice<T>(&self, items: Vec<T>) -> PageResult<T> {
        let total = items.len() as u64;
        let records = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit())
            .collect();
        PageResult { total, records }
    }
}

/// One page of records plus the total count across all pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub total: u64,
    pub records: Vec<T>,
}

impl<T> PageResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            total: self.total,
            records: self.records.into_iter().map(f).collect(),
        }
    }
}
