use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// A 1-based page request. Positions are derived, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn of(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Offset of the first item on the page.
    pub fn start_position(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Offset one past the last item on the page.
    pub fn end_position(&self) -> i64 {
        self.start_position().saturating_add(self.page_size)
    }
}

/// One page of items plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDto<T> {
    pub items: Vec<T>,
    pub total_count: i64,
}

impl<T> CollectionDto<T> {
    pub fn new(items: Vec<T>, total_count: i64) -> Self {
        Self { items, total_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_for_first_and_later_pages() {
        let p = Pagination::of(1, 10);
        assert_eq!((p.start_position(), p.end_position()), (0, 10));

        let p = Pagination::of(3, 25);
        assert_eq!((p.start_position(), p.end_position()), (50, 75));
    }

    #[test]
    fn out_of_range_pages_are_passed_through() {
        let p = Pagination::of(0, 10);
        assert_eq!((p.start_position(), p.end_position()), (-10, 0));

        let p = Pagination::of(i64::MIN, 20);
        assert_eq!(p.start_position(), i64::MIN);
        assert_eq!(p.end_position(), i64::MIN + 20);

        let p = Pagination::of(i64::MAX, i64::MAX);
        assert_eq!((p.start_position(), p.end_position()), (i64::MAX, i64::MAX));
    }

    #[test]
    fn default_is_first_page() {
        let p = Pagination::default();
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, DEFAULT_PAGE_SIZE);
    }
}
