use thiserror::Error;

/// Failures the listing reports through its read model. They never escape
/// the engine as panics or `Err` returns to the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    /// The query service rejected the call or returned malformed data.
    /// Not retried; the next user action issues a fresh request.
    #[error("query service failed: {message}")]
    TransientFetchFailure { message: String },
}

impl ListingError {
    pub fn fetch_failure(error: &anyhow::Error) -> Self {
        ListingError::TransientFetchFailure { message: format!("{error:#}") }
    }

    /// The request's task panicked or was aborted before it settled.
    pub fn interrupted() -> Self {
        ListingError::TransientFetchFailure { message: "request interrupted before it settled".to_string() }
    }
}
