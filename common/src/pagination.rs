//! Pagination arithmetic. Pages are 1-based.

use serde::{Deserialize, Serialize};


/// `max(1, ceil(total_count / page_size))`. An empty result is still "page 1 of 1".
pub fn total_pages(total_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }
    total_count.div_ceil(page_size).max(1)
}

pub fn clamp_page(page: u64, total_pages: u64) -> u64 {
    page.clamp(1, total_pages.max(1))
}

/// Highest page whose row offset still fits in a `u64`. Pages past it are
/// past any real result set, so clamping to it changes nothing visible.
pub fn max_page_index(page_size: u64) -> u64 {
    u64::MAX / page_size.max(1)
}

/// Derived view of where the current page sits in the result set; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationView {
    pub page_index: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
    /// 1-based position of the first displayed row, 0 when nothing matched.
    pub displayed_range_start: u64,
    pub displayed_range_end: u64,
}

impl PaginationView {
    pub fn new(page_index: u64, page_size: u64, total_count: u64) -> Self {
        let total_pages = total_pages(total_count, page_size);
        let page_index = clamp_page(page_index, total_pages);
        let (displayed_range_start, displayed_range_end) = if total_count == 0 {
            (0, 0)
        } else {
            (
                (page_index - 1) * page_size + 1,
                page_index.saturating_mul(page_size).min(total_count),
            )
        };
        Self {
            page_index,
            page_size,
            total_count,
            total_pages,
            displayed_range_start,
            displayed_range_end,
        }
    }
}
