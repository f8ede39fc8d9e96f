//! Cursor pagination over the export cursor (`auto_increment`).
//!
//! Clients resume with the `last_id` of the previous page. The range is
//! inclusive, so the next request re-reads the last entity of the previous
//! page; clients are expected to dedupe on it.

use std::future::Future;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use catalog_export_core::ExportResult;
use catalog_export_products::Product;
use catalog_export_sales::Order;

use crate::store::StoreError;

/// Entities exported in cursor order.
pub trait Cursored {
    fn cursor(&self) -> u64;
}

impl Cursored for Product {
    fn cursor(&self) -> u64 {
        self.auto_increment
    }
}

impl Cursored for Order {
    fn cursor(&self) -> u64 {
        self.auto_increment
    }
}

/// Maximum number of entities per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    /// One entity per page; the historical export behavior.
    pub const DEFAULT: PageSize = PageSize(NonZeroUsize::MIN);

    /// Hard upper bound so a single request cannot drain the catalog.
    pub const MAX: usize = 500;

    pub fn new(size: usize) -> Option<Self> {
        if size > Self::MAX {
            return None;
        }
        NonZeroUsize::new(size).map(Self)
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One page of entities plus the cursor to resume from.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the last item; `None` when the page is empty.
    pub last_id: Option<u64>,
}

impl<T: Cursored> Page<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        let last_id = items.last().map(Cursored::cursor);
        Self { items, last_id }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorPaginator {
    page_size: PageSize,
}

impl CursorPaginator {
    pub fn new(page_size: PageSize) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Fetch the page starting at `from_id` (inclusive).
    ///
    /// `fetch` is the storage range query. Its result is re-checked here: items
    /// below the cursor are dropped, the rest sorted ascending and capped.
    pub async fn page<T, F, Fut>(&self, from_id: u64, fetch: F) -> ExportResult<Page<T>>
    where
        T: Cursored,
        F: FnOnce(u64, usize) -> Fut,
        Fut: Future<Output = Result<Vec<T>, StoreError>>,
    {
        let limit = self.page_size.get();
        let mut items = fetch(from_id, limit).await?;

        items.retain(|item| item.cursor() >= from_id);
        items.sort_by_key(Cursored::cursor);
        items.truncate(limit);

        tracing::debug!(from_id, limit, returned = items.len(), "fetched export page");
        Ok(Page::from_items(items))
    }
}
