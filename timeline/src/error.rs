//! Error types for the timeline provider.

use thiserror::Error;

/// Result type alias for timeline operations.
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Error type for timeline operations.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// XRPC error response from the service.
    #[error("xrpc error: {error}: {message} (status={status})")]
    Xrpc {
        status: u16,
        error: String,
        message: String,
    },

    /// Login failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The timeline has not been fetched yet.
    #[error("Timeline not initialized. Call 'initialize()' first.")]
    NotInitialized,

    /// Page numbers start at 1.
    #[error("invalid page number {0}; pages start at 1")]
    InvalidPage(usize),

    /// No post with this sequence number in the current snapshot.
    #[error("No post found with number {0}.")]
    PostNotFound(usize),
}
