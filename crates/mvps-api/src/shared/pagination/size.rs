//! Page size and page number normalisation

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Clamp a requested size into `MIN_PAGE_SIZE..=MAX_PAGE_SIZE`.
///
/// Used for both the cursor `size` and the offset `limit`.
pub fn validate_page_size(size: Option<i64>) -> u32 {
    match size {
        None => DEFAULT_PAGE_SIZE,
        Some(s) => s.clamp(MIN_PAGE_SIZE as i64, MAX_PAGE_SIZE as i64) as u32,
    }
}

/// 1-based page number; anything below 1 becomes 1.
pub fn validate_page_number(page: Option<i64>) -> u32 {
    page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_clamping() {
        assert_eq!(validate_page_size(None), 20);
        assert_eq!(validate_page_size(Some(0)), 1);
        assert_eq!(validate_page_size(Some(-7)), 1);
        assert_eq!(validate_page_size(Some(5)), 5);
        assert_eq!(validate_page_size(Some(100)), 100);
        assert_eq!(validate_page_size(Some(500)), 100);
        assert_eq!(validate_page_size(Some(i64::MAX)), 100);
    }

    #[test]
    fn test_page_number() {
        assert_eq!(validate_page_number(None), 1);
        assert_eq!(validate_page_number(Some(0)), 1);
        assert_eq!(validate_page_number(Some(-3)), 1);
        assert_eq!(validate_page_number(Some(4)), 4);
        assert_eq!(validate_page_number(Some(i64::MAX)), u32::MAX);
    }
}
