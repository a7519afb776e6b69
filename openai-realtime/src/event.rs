//! Event types for the Realtime API.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Error, Result};
use crate::types::*;

// ============================================================================
// Client Event Types (sent from client to server)
// ============================================================================

pub const EVENT_TYPE_SESSION_UPDATE: &str = "session.update";
pub const EVENT_TYPE_INPUT_AUDIO_BUFFER_APPEND: &str = "input_audio_buffer.append";
pub const EVENT_TYPE_INPUT_AUDIO_BUFFER_COMMIT: &str = "input_audio_buffer.commit";
pub const EVENT_TYPE_CONVERSATION_ITEM_CREATE: &str = "conversation.item.create";
pub const EVENT_TYPE_RESPONSE_CREATE: &str = "response.create";

// ============================================================================
// Server Event Types (sent from server to client)
// ============================================================================

pub const EVENT_TYPE_ERROR: &str = "error";

pub const EVENT_TYPE_SESSION_CREATED: &str = "session.created";
pub const EVENT_TYPE_SESSION_UPDATED: &str = "session.updated";

pub const EVENT_TYPE_CONVERSATION_ITEM_INPUT_AUDIO_TRANSCRIPTION_COMPLETED: &str =
    "conversation.item.input_audio_transcription.completed";

pub const EVENT_TYPE_INPUT_AUDIO_BUFFER_SPEECH_STARTED: &str = "input_audio_buffer.speech_started";

pub const EVENT_TYPE_RESPONSE_CREATED: &str = "response.created";
pub const EVENT_TYPE_RESPONSE_DONE: &str = "response.done";
pub const EVENT_TYPE_RESPONSE_OUTPUT_ITEM_ADDED: &str = "response.output_item.added";
pub const EVENT_TYPE_RESPONSE_AUDIO_DELTA: &str = "response.audio.delta";
pub const EVENT_TYPE_RESPONSE_AUDIO_TRANSCRIPT_DONE: &str = "response.audio_transcript.done";
pub const EVENT_TYPE_RESPONSE_FUNCTION_CALL_ARGUMENTS_DONE: &str =
    "response.function_call_arguments.done";

// ============================================================================
// Client Event
// ============================================================================

/// Event sent from the client to the server.
///
/// Serializes to the wire shape, e.g. `{"type":"input_audio_buffer.commit"}`.
/// The transport adds an `event_id` when it sends the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },

    /// Base64-encoded PCM16 audio.
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend { audio: String },

    #[serde(rename = "input_audio_buffer.commit")]
    InputAudioBufferCommit,

    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },

    #[serde(rename = "response.create")]
    ResponseCreate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response: Option<ResponseCreateOptions>,
    },
}

impl ClientEvent {
    /// Returns the wire `type` of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::SessionUpdate { .. } => EVENT_TYPE_SESSION_UPDATE,
            ClientEvent::InputAudioBufferAppend { .. } => EVENT_TYPE_INPUT_AUDIO_BUFFER_APPEND,
            ClientEvent::InputAudioBufferCommit => EVENT_TYPE_INPUT_AUDIO_BUFFER_COMMIT,
            ClientEvent::ConversationItemCreate { .. } => EVENT_TYPE_CONVERSATION_ITEM_CREATE,
            ClientEvent::ResponseCreate { .. } => EVENT_TYPE_RESPONSE_CREATE,
        }
    }

    /// Serializes the event with the given `event_id`.
    pub fn to_json(&self, event_id: &str) -> Result<String> {
        let mut value = serde_json::to_value(self)?;
        if let serde_json::Value::Object(ref mut map) = value {
            map.insert("event_id".to_string(), event_id.into());
        }
        Ok(value.to_string())
    }
}

// ============================================================================
// Server Event
// ============================================================================

/// Server event received from the Realtime API.
///
/// A flat view over every event kind; fields not carried by a kind stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerEvent {
    /// Event type.
    #[serde(rename = "type", default)]
    pub event_type: String,

    #[serde(default)]
    pub event_id: Option<String>,

    /// Session information (session.created, session.updated).
    #[serde(default)]
    pub session: Option<SessionResource>,

    /// Conversation item. Older servers send it as `output_item` on
    /// response.output_item.added.
    #[serde(default, alias = "output_item")]
    pub item: Option<ConversationItem>,

    #[serde(default)]
    pub item_id: Option<String>,

    /// Transcript text (transcript done, transcription completed).
    #[serde(default)]
    pub transcript: Option<String>,

    /// Response information (response.created, response.done).
    #[serde(default)]
    pub response: Option<ResponseResource>,

    #[serde(default)]
    pub response_id: Option<String>,

    /// Incremental payload; base64 audio for response.audio.delta.
    #[serde(default)]
    pub delta: Option<String>,

    // === Function call events ===
    #[serde(default)]
    pub call_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Complete JSON-encoded arguments.
    #[serde(default)]
    pub arguments: Option<String>,

    #[serde(default)]
    pub error: Option<EventError>,

    /// Decoded audio for response.audio.delta (not from JSON).
    #[serde(skip)]
    pub audio: Option<Vec<u8>>,
}

impl ServerEvent {
    /// Returns true if this is an audio delta event.
    pub fn is_audio_delta(&self) -> bool {
        self.event_type == EVENT_TYPE_RESPONSE_AUDIO_DELTA
    }

    /// Returns true if this is a response done event.
    pub fn is_response_done(&self) -> bool {
        self.event_type == EVENT_TYPE_RESPONSE_DONE
    }
}

/// Error information from error events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
}

impl EventError {
    /// Converts to an API error.
    pub fn to_api_error(&self) -> ApiError {
        ApiError {
            error_type: self.error_type.clone(),
            code: self.code.clone(),
            message: self.message.clone(),
            param: self.param.clone(),
            event_id: self.event_id.clone(),
        }
    }
}

/// Parses one text frame from the server.
///
/// Audio deltas are decoded into [`ServerEvent::audio`]; `error` events become
/// [`Error::Api`].
pub fn parse_event(text: &str) -> Result<ServerEvent> {
    let mut event: ServerEvent = serde_json::from_str(text)?;

    if event.event_type == EVENT_TYPE_RESPONSE_AUDIO_DELTA {
        if let Some(ref delta) = event.delta {
            match base64::engine::general_purpose::STANDARD.decode(delta) {
                Ok(decoded) => event.audio = Some(decoded),
                Err(e) => tracing::warn!(error = %e, "undecodable audio delta"),
            }
        }
    }

    if event.event_type == EVENT_TYPE_ERROR {
        let api = event
            .error
            .as_ref()
            .map(EventError::to_api_error)
            .unwrap_or_else(|| ApiError {
                message: "unspecified server error".to_string(),
                ..Default::default()
            });
        return Err(Error::Api(api));
    }

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn wire(event: &ClientEvent) -> Value {
        serde_json::from_str(&event.to_json("evt_1").unwrap()).unwrap()
    }

    #[test]
    fn test_commit_shape() {
        let v = wire(&ClientEvent::InputAudioBufferCommit);
        assert_eq!(v, json!({"type": "input_audio_buffer.commit", "event_id": "evt_1"}));
    }

    #[test]
    fn test_function_output_shape() {
        let event = ClientEvent::ConversationItemCreate {
            item: ConversationItem::function_call_output("call_7", r#"{"status":"success"}"#),
        };
        let v = wire(&event);
        assert_eq!(v["type"], "conversation.item.create");
        assert_eq!(v["item"]["type"], "function_call_output");
        assert_eq!(v["item"]["call_id"], "call_7");
        assert_eq!(v["item"]["output"], r#"{"status":"success"}"#);
        assert!(v["item"].get("role").is_none());
    }

    #[test]
    fn test_response_create_shape() {
        let bare = wire(&ClientEvent::ResponseCreate { response: None });
        assert!(bare.get("response").is_none());

        let v = wire(&ClientEvent::ResponseCreate {
            response: Some(ResponseCreateOptions {
                modalities: vec!["text".into(), "audio".into()],
                instructions: Some("Greet the user".into()),
            }),
        });
        assert_eq!(v["response"]["modalities"], json!(["text", "audio"]));
        assert_eq!(v["response"]["instructions"], "Greet the user");
        assert_eq!(
            ClientEvent::ResponseCreate { response: None }.event_type(),
            EVENT_TYPE_RESPONSE_CREATE
        );
    }

    #[test]
    fn test_session_update_shape() {
        let event = ClientEvent::SessionUpdate {
            session: SessionConfig {
                modalities: vec!["text".into(), "audio".into()],
                voice: Some(VOICE_ECHO.into()),
                tool_choice: Some(TOOL_CHOICE_AUTO.into()),
                temperature: Some(0.7),
                input_audio_transcription: Some(TranscriptionConfig {
                    model: TRANSCRIPTION_WHISPER_1.into(),
                }),
                tools: vec![Tool::function("get_page_summary")
                    .with_parameters(json!({"type": "object", "properties": {}}))],
                ..Default::default()
            },
        };
        let v = wire(&event);
        assert_eq!(v["session"]["voice"], "echo");
        assert_eq!(v["session"]["tool_choice"], "auto");
        assert_eq!(v["session"]["input_audio_transcription"]["model"], "whisper-1");
        assert_eq!(v["session"]["tools"][0]["type"], "function");
        assert!(v["session"].get("turn_detection").is_none());
        assert!(v["session"].get("instructions").is_none());
    }

    #[test]
    fn test_parse_audio_delta() {
        let event = parse_event(r#"{"type":"response.audio.delta","delta":"AQIDBA=="}"#).unwrap();
        assert!(event.is_audio_delta());
        assert_eq!(event.audio.as_deref(), Some(&[1u8, 2, 3, 4][..]));
    }

    #[test]
    fn test_parse_function_call_done() {
        let event = parse_event(
            r#"{"type":"response.function_call_arguments.done","call_id":"c1","name":"get_post_detail","arguments":"{\"post_number\":3}"}"#,
        )
        .unwrap();
        assert_eq!(event.call_id.as_deref(), Some("c1"));
        assert_eq!(event.name.as_deref(), Some("get_post_detail"));
        assert_eq!(event.arguments.as_deref(), Some(r#"{"post_number":3}"#));
    }

    #[test]
    fn test_parse_output_item_alias() {
        let event = parse_event(
            r#"{"type":"response.output_item.added","output_item":{"type":"message","role":"assistant","content":[{"type":"text","text":"hi"}]}}"#,
        )
        .unwrap();
        let item = event.item.unwrap();
        assert_eq!(item.text().as_deref(), Some("hi"));
    }

    #[test]
    fn test_parse_error_event() {
        let err = parse_event(
            r#"{"type":"error","error":{"type":"invalid_request_error","code":"bad","message":"nope"}}"#,
        )
        .unwrap_err();
        match err {
            Error::Api(api) => {
                assert_eq!(api.code.as_deref(), Some("bad"));
                assert_eq!(api.message, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_event("not json"), Err(Error::Json(_))));
        let unknown = parse_event(r#"{"type":"rate_limits.updated","rate_limits":[]}"#).unwrap();
        assert_eq!(unknown.event_type, "rate_limits.updated");
    }
}
