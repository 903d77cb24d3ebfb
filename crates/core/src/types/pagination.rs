//! Pagination constants and math for the dog search.

/// Number of dogs shown per search page.
pub const PAGE_SIZE: u32 = 24;

/// The remote search refuses `from + size` beyond this many results.
pub const MAX_RESULT_WINDOW: u32 = 10_000;

/// Number of pages needed to show `total` results, `page_size` at a time.
///
/// A zero page size yields zero pages.
#[must_use]
pub const fn total_pages(total: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(100, 24), 5);
        assert_eq!(total_pages(96, 24), 4);
        assert_eq!(total_pages(1, 24), 1);
    }

    #[test]
    fn test_total_pages_empty() {
        assert_eq!(total_pages(0, 24), 0);
        assert_eq!(total_pages(10, 0), 0);
    }
}
