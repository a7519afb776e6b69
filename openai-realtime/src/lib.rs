//! OpenAI Realtime API client.
//!
//! A WebSocket transport for realtime voice conversations: typed client
//! events, a flat server event view, and the [`Session`] trait the voice
//! engine drives.
//!
//! # Features
//!
//! - WebSocket sessions with background read/write tasks
//! - Audio input/output as PCM16 at 24kHz
//! - Function calling
//!
//! # Example
//!
//! ```rust,no_run
//! use skytalk_realtime::{Client, Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("your-api-key")?;
//!     let mut session = client.connect_websocket(None).await?;
//!
//!     let config = SessionConfig {
//!         modalities: vec!["text".to_string(), "audio".to_string()],
//!         voice: Some("echo".to_string()),
//!         ..Default::default()
//!     };
//!     session.update_session(&config).await?;
//!     session.add_user_message("Hello!").await?;
//!     session.create_response(None).await?;
//!
//!     while let Some(result) = session.recv().await {
//!         let event = result?;
//!         if event.is_response_done() {
//!             break;
//!         }
//!     }
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod event;
pub mod session;
pub mod types;
pub mod websocket;

pub use client::{Client, ClientBuilder};
pub use error::{ApiError, Error, Result};
pub use event::{parse_event, ClientEvent, EventError, ServerEvent};
pub use session::Session;
pub use types::*;
pub use websocket::WebSocketSession;

pub use event::{
    EVENT_TYPE_CONVERSATION_ITEM_CREATE,
    EVENT_TYPE_CONVERSATION_ITEM_INPUT_AUDIO_TRANSCRIPTION_COMPLETED, EVENT_TYPE_ERROR,
    EVENT_TYPE_INPUT_AUDIO_BUFFER_APPEND, EVENT_TYPE_INPUT_AUDIO_BUFFER_COMMIT,
    EVENT_TYPE_INPUT_AUDIO_BUFFER_SPEECH_STARTED, EVENT_TYPE_RESPONSE_AUDIO_DELTA,
    EVENT_TYPE_RESPONSE_AUDIO_TRANSCRIPT_DONE, EVENT_TYPE_RESPONSE_CREATE,
    EVENT_TYPE_RESPONSE_CREATED, EVENT_TYPE_RESPONSE_DONE,
    EVENT_TYPE_RESPONSE_FUNCTION_CALL_ARGUMENTS_DONE, EVENT_TYPE_RESPONSE_OUTPUT_ITEM_ADDED,
    EVENT_TYPE_SESSION_CREATED, EVENT_TYPE_SESSION_UPDATE, EVENT_TYPE_SESSION_UPDATED,
};
