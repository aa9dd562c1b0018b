//! Constants shared by every listing view.

/// Rows per result page.
pub const PAGE_SIZE: u64 = 25;

/// Quiet window after the last keystroke before the search text settles.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Identity column every listing table is ordered by.
pub const DEFAULT_ID_COLUMN: &str = "id";
