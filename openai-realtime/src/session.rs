//! Session trait for the Realtime API.

use async_trait::async_trait;
use base64::Engine;

use crate::error::Result;
use crate::event::{ClientEvent, ServerEvent};
use crate::types::*;

/// Common interface for realtime sessions.
///
/// Implementations only provide the three primitives; the helpers build
/// typed client events on top of [`Session::send`].
#[async_trait]
pub trait Session: Send + Sync {
    /// Sends one client event.
    async fn send(&self, event: ClientEvent) -> Result<()>;

    /// Receives the next event from the server.
    /// Returns None when the session is closed.
    async fn recv(&mut self) -> Option<Result<ServerEvent>>;

    /// Closes the session connection.
    async fn close(&self) -> Result<()>;

    /// Returns the session ID assigned by the server, once session.created
    /// has been received.
    fn session_id(&self) -> Option<String> {
        None
    }

    // === Helpers ===

    /// Updates the session configuration.
    async fn update_session(&self, config: &SessionConfig) -> Result<()> {
        self.send(ClientEvent::SessionUpdate {
            session: config.clone(),
        })
        .await
    }

    /// Appends PCM audio (24kHz, 16-bit, mono, little-endian) to the input buffer.
    async fn append_audio(&self, audio: &[u8]) -> Result<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(audio);
        self.append_audio_base64(encoded).await
    }

    /// Appends base64-encoded audio to the input buffer.
    async fn append_audio_base64(&self, audio_base64: String) -> Result<()> {
        self.send(ClientEvent::InputAudioBufferAppend {
            audio: audio_base64,
        })
        .await
    }

    /// Commits the input audio buffer.
    async fn commit_input(&self) -> Result<()> {
        self.send(ClientEvent::InputAudioBufferCommit).await
    }

    /// Adds a user text message to the conversation.
    async fn add_user_message(&self, text: &str) -> Result<()> {
        self.send(ClientEvent::ConversationItemCreate {
            item: ConversationItem::user_text(text),
        })
        .await
    }

    /// Adds a function call output to the conversation.
    async fn add_function_call_output(&self, call_id: &str, output: &str) -> Result<()> {
        self.send(ClientEvent::ConversationItemCreate {
            item: ConversationItem::function_call_output(call_id, output),
        })
        .await
    }

    /// Requests the model to generate a response.
    async fn create_response(&self, opts: Option<&ResponseCreateOptions>) -> Result<()> {
        self.send(ClientEvent::ResponseCreate {
            response: opts.cloned(),
        })
        .await
    }
}
