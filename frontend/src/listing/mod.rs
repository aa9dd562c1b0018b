//! The listing engine: debounced search input, race-free fetching and
//! pagination state, shared by every faceted listing view.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod debounced_input;
pub mod directory_listing;
pub mod error;
pub mod fetch_coordinator;
pub mod paged_result_store;

pub use debounced_input::DebouncedInput;
pub use directory_listing::DirectoryListing;
pub use error::ListingError;
pub use fetch_coordinator::{FetchCoordinator, FetchOutcome, RequestToken};
pub use paged_result_store::{ListingView, PagedResultStore};

// state behind these locks stays consistent even if a holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
