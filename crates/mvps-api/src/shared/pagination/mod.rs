//! Keyset Pagination Engine
//!
//! Shared by every listable resource:
//! - `cursor` - opaque cursor codec
//! - `size` - page size / page number normalisation
//! - `page` - page assembly and response shapes
//!
//! Both modes read through a [`PageSource`], so for the same filter value
//! keyset and offset pagination see the same rows in the same `id ASC` order.

pub mod cursor;
pub mod page;
pub mod size;

use async_trait::async_trait;
use tracing::debug;

use crate::shared::error::Result;

pub use cursor::{decode_cursor, encode_cursor};
pub use page::{CursorPage, OffsetPage, PageInfo};
pub use size::{validate_page_number, validate_page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

/// Monotonic ordering key of a stored row
pub type RowKey = i64;

/// Anything with a unique, never reused ordering key.
pub trait Keyed {
    fn key(&self) -> RowKey;
}

/// Storage collaborator for both pagination modes.
///
/// Implementations must order by key ascending and apply `filter`
/// identically in all three methods.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Keyed + Send;
    type Filter: Send + Sync + ?Sized;

    /// Up to `limit` matching rows with key greater than `after`.
    async fn find_page_after(
        &self,
        after: Option<RowKey>,
        filter: &Self::Filter,
        limit: u32,
    ) -> Result<Vec<Self::Item>>;

    /// Up to `limit` matching rows, skipping the first `offset`.
    async fn find_page_at(
        &self,
        offset: u64,
        filter: &Self::Filter,
        limit: u32,
    ) -> Result<Vec<Self::Item>>;

    async fn count_matching(&self, filter: &Self::Filter) -> Result<u64>;
}

/// Fetch one keyset page.
///
/// A cursor that does not decode restarts at the first page.
pub async fn fetch_cursor_page<S>(
    source: &S,
    cursor: Option<&str>,
    size: Option<i64>,
    filter: &S::Filter,
) -> Result<CursorPage<S::Item>>
where
    S: PageSource + ?Sized,
{
    let size = validate_page_size(size);
    let after = decode_cursor(cursor);
    if after.is_none() && cursor.is_some_and(|c| !c.trim().is_empty()) {
        debug!(cursor = ?cursor, "Ignoring undecodable cursor, starting from first page");
    }

    // one extra row decides has_next
    let rows = source.find_page_after(after, filter, size + 1).await?;
    let fetched = rows.len();
    let page = CursorPage::assemble(rows, size);

    debug!(
        after = ?after,
        size,
        fetched,
        has_next = page.has_next,
        "Fetched cursor page"
    );
    Ok(page)
}

/// Fetch one offset page together with totals.
pub async fn fetch_offset_page<S>(
    source: &S,
    page: Option<i64>,
    limit: Option<i64>,
    filter: &S::Filter,
) -> Result<OffsetPage<S::Item>>
where
    S: PageSource + ?Sized,
{
    let page = validate_page_number(page);
    let limit = validate_page_size(limit);

    let total = source.count_matching(filter).await?;
    let offset = u64::from(page - 1) * u64::from(limit);
    let rows = if offset >= total {
        Vec::new()
    } else {
        source.find_page_at(offset, filter, limit).await?
    };

    debug!(page, limit, total, returned = rows.len(), "Fetched offset page");
    Ok(OffsetPage::new(rows, PageInfo::new(page, limit, total)))
}
