//! Forward-only incremental pagination.

use crate::errors::Result;
use crate::models::Page;
use std::future::Future;

/// Page number of the first request.
pub const FIRST_PAGE: u32 = 1;

/// Pages of one list query, kept in fetch order.
#[derive(Debug, Clone)]
pub struct InfiniteQuery<T> {
    size: u32,
    pages: Vec<Page<T>>,
}

impl<T> InfiniteQuery<T> {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            pages: Vec::new(),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.size
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages.len()
    }

    /// Total reported by the most recent page.
    pub fn total(&self) -> Option<u64> {
        self.pages.last().map(|p| p.total)
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }

    /// All loaded items, concatenated in fetch order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    /// Number of the page to request next, if any.
    pub fn next_page(&self) -> Option<u32> {
        match self.pages.last() {
            None => Some(FIRST_PAGE),
            Some(last) => last.next_page(),
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page().is_some()
    }

    pub fn reset(&mut self) {
        self.pages.clear();
    }

    /// Request the next page through `fetch(page, size)`.
    ///
    /// Returns `false` without calling `fetch` when nothing is left. A failed
    /// fetch leaves the loaded pages untouched.
    pub async fn fetch_next<F, Fut>(&mut self, fetch: F) -> Result<bool>
    where
        F: FnOnce(u32, u32) -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
    {
        let Some(page) = self.next_page() else {
            return Ok(false);
        };
        let loaded = fetch(page, self.size).await?;
        tracing::trace!(page, items = loaded.items.len(), total = loaded.total, "page loaded");
        self.pages.push(loaded);
        Ok(true)
    }

    /// The trailing sentinel scrolled into view.
    pub async fn on_sentinel_visible<F, Fut>(&mut self, fetch: F) -> Result<bool>
    where
        F: FnOnce(u32, u32) -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
    {
        if self.pages.is_empty() {
            return Ok(false);
        }
        self.fetch_next(fetch).await
    }
}
