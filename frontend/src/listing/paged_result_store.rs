//! Rows of the current page plus the pagination state derived from them.

use common::pagination::{PaginationView, clamp_page, total_pages};
use serde::{Deserialize, Serialize};

use crate::listing::error::ListingError;

/// What the page renders. Built fresh from the store on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingView<R> {
    pub rows: Vec<R>,
    pub loading: bool,
    pub error: Option<String>,
    pub displayed_range_start: u64,
    pub displayed_range_end: u64,
    pub total_count: u64,
    pub page_index: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone)]
pub struct PagedResultStore<R> {
    rows: Vec<R>,
    total_count: u64,
    page_index: u64,
    page_size: u64,
    loading: bool,
    error: Option<ListingError>,
}

impl<R: Clone> PagedResultStore<R> {
    pub fn new(page_size: u64) -> Self {
        Self {
            rows: Vec::new(),
            total_count: 0,
            page_index: 1,
            page_size: page_size.max(1),
            loading: false,
            error: None,
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ListingError> {
        self.error.as_ref()
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total_count, self.page_size)
    }

    pub fn pagination(&self) -> PaginationView {
        PaginationView::new(self.page_index, self.page_size, self.total_count)
    }

    /// Replaces the rows and total, then re-clamps the current page against
    /// the new total so it never points past the last page.
    pub fn set_result(&mut self, rows: Vec<R>, total_count: u64) {
        self.rows = rows;
        self.total_count = total_count;
        self.error = None;
        self.page_index = clamp_page(self.page_index, self.total_pages());
    }

    /// Clamps `page` into `[1, total_pages]` using the current total and
    /// returns the effective page.
    pub fn set_page(&mut self, page: u64) -> u64 {
        self.page_index = clamp_page(page, self.total_pages());
        self.page_index
    }

    /// Sets the page without clamping, for the page a response was fetched
    /// for. The following `set_result` clamps it against the new total.
    pub fn restore_page(&mut self, page: u64) {
        self.page_index = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: u64) {
        self.page_size = page_size.max(1);
        self.page_index = clamp_page(self.page_index, self.total_pages());
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Keeps the last good rows and total; the error is shown alongside them.
    pub fn set_error(&mut self, error: ListingError) {
        self.error = Some(error);
    }

    pub fn view(&self) -> ListingView<R> {
        let pagination = self.pagination();
        ListingView {
            rows: self.rows.clone(),
            loading: self.loading,
            error: self.error.as_ref().map(|e| e.to_string()),
            displayed_range_start: pagination.displayed_range_start,
            displayed_range_end: pagination.displayed_range_end,
            total_count: self.total_count,
            page_index: pagination.page_index,
            total_pages: pagination.total_pages,
        }
    }
}
