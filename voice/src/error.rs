//! Error types for the voice engine.

use thiserror::Error;

/// Result type alias for voice engine operations.
pub type Result<T> = std::result::Result<T, VoiceError>;

/// Error type for the voice engine.
///
/// Only `Transport` and fatal `Device` errors end a session; protocol
/// problems are logged and skipped.
#[derive(Error, Debug)]
pub enum VoiceError {
    /// Connection refused, dropped, or closed by the server.
    #[error("transport error: {0}")]
    Transport(#[from] skytalk_realtime::Error),

    /// Microphone or speaker unavailable.
    #[error("device error: {0}")]
    Device(#[from] std::io::Error),

    /// Malformed or unexpected inbound event.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl VoiceError {
    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        VoiceError::Protocol(msg.into())
    }
}
