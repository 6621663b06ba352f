//! Page shapes returned by both pagination modes

use serde::Serialize;
use utoipa::ToSchema;

use super::cursor::encode_cursor;
use super::Keyed;

/// One keyset page.
///
/// `next_cursor` is serialized as `null` (never omitted) on the terminal page.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    pub data: Vec<T>,
    pub page_size: u32,
    pub next_cursor: Option<String>,
    pub has_next: bool,
}

impl<T: Keyed> CursorPage<T> {
    /// Build a page from up to `size + 1` fetched rows.
    ///
    /// The row past `size` only signals that another page exists and is dropped.
    pub fn assemble(mut rows: Vec<T>, size: u32) -> Self {
        let size_usize = size as usize;
        let has_next = rows.len() > size_usize;
        if has_next {
            rows.truncate(size_usize);
        }

        let next_key = if has_next { rows.last().map(Keyed::key) } else { None };

        Self {
            data: rows,
            page_size: size,
            next_cursor: encode_cursor(next_key),
            has_next,
        }
    }
}

impl<T> CursorPage<T> {
    /// Convert the page items, keeping the cursor metadata.
    pub fn map<U, F>(self, f: F) -> CursorPage<U>
    where
        F: FnMut(T) -> U,
    {
        CursorPage {
            data: self.data.into_iter().map(f).collect(),
            page_size: self.page_size,
            next_cursor: self.next_cursor,
            has_next: self.has_next,
        }
    }
}

/// Position metadata of an offset page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PageInfo {
    pub fn new(page: u32, limit: u32, total_items: u64) -> Self {
        let limit_u64 = u64::from(limit.max(1));
        Self {
            page,
            limit,
            total_items,
            total_pages: total_items.div_ceil(limit_u64),
        }
    }
}

/// One offset page with totals
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OffsetPage<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> OffsetPage<T> {
    pub fn new(data: Vec<T>, pagination: PageInfo) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }

    pub fn map<U, F>(self, f: F) -> OffsetPage<U>
    where
        F: FnMut(T) -> U,
    {
        OffsetPage {
            success: self.success,
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::pagination::{decode_cursor, RowKey};

    #[derive(Debug, Clone, PartialEq)]
    struct Row(RowKey);

    impl Keyed for Row {
        fn key(&self) -> RowKey {
            self.0
        }
    }

    fn rows(range: std::ops::RangeInclusive<RowKey>) -> Vec<Row> {
        range.map(Row).collect()
    }

    #[test]
    fn test_empty_rows_give_terminal_page() {
        let page = CursorPage::assemble(Vec::<Row>::new(), 10);
        assert!(page.data.is_empty());
        assert!(!page.has_next);
        assert_eq!(page.next_cursor, None);
        assert_eq!(page.page_size, 10);
    }

    #[test]
    fn test_exact_size_has_no_next() {
        let page = CursorPage::assemble(rows(1..=10), 10);
        assert_eq!(page.data.len(), 10);
        assert!(!page.has_next);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_lookahead_row_is_dropped() {
        let page = CursorPage::assemble(rows(11..=21), 10);
        assert_eq!(page.data.len(), 10);
        assert!(page.has_next);
        assert_eq!(page.data.last(), Some(&Row(20)));
        assert_eq!(decode_cursor(page.next_cursor.as_deref()), Some(20));
    }

    #[test]
    fn test_terminal_cursor_serializes_as_null() {
        let page = CursorPage::assemble(rows(1..=2), 5).map(|r| r.0);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["nextCursor"], serde_json::Value::Null);
        assert!(json.as_object().unwrap().contains_key("nextCursor"));
        assert_eq!(json["pageSize"], 5);
        assert_eq!(json["hasNext"], false);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(PageInfo::new(1, 10, 0).total_pages, 0);
        assert_eq!(PageInfo::new(1, 10, 1).total_pages, 1);
        assert_eq!(PageInfo::new(1, 10, 10).total_pages, 1);
        assert_eq!(PageInfo::new(1, 10, 25).total_pages, 3);
    }

    #[test]
    fn test_offset_page_shape() {
        let page = OffsetPage::new(vec![1, 2], PageInfo::new(2, 2, 5));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["pagination"]["totalItems"], 5);
        assert_eq!(json["pagination"]["totalPages"], 3);
        assert_eq!(json["pagination"]["page"], 2);
        assert_eq!(json["pagination"]["limit"], 2);
    }
}
