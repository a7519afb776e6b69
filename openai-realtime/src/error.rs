//! Error types for the realtime client.

use thiserror::Error;

/// Result type for realtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the Realtime API.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection could not be established.
    #[error("connection error: {0}")]
    Connection(String),

    /// WebSocket error on an established connection.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error event reported by the server.
    #[error("api error: {0}")]
    Api(ApiError),

    /// The session's write path is gone.
    #[error("session closed")]
    SessionClosed,

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns true if the error means the transport can no longer be used.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::WebSocket(_) | Error::SessionClosed
        )
    }
}

/// Error reported by the server in an `error` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiError {
    /// Error type (e.g., "invalid_request_error").
    pub error_type: Option<String>,
    /// Error code (e.g., "invalid_value").
    pub code: Option<String>,
    /// Human-readable error message.
    pub message: String,
    /// Parameter that caused the error.
    pub param: Option<String>,
    /// Client event ID that caused the error.
    pub event_id: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code.as_deref().or(self.error_type.as_deref()) {
            Some(kind) => write!(f, "{}: {}", kind, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
