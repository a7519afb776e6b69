//! Type definitions for the Realtime API payloads.

use serde::{Deserialize, Serialize};

// ============================================================================
// Models
// ============================================================================

/// GPT-4o realtime preview model (2024-10-01 version). Used when no model is configured.
pub const MODEL_GPT4O_REALTIME_PREVIEW_20241001: &str = "gpt-4o-realtime-preview-2024-10-01";
/// GPT-4o realtime preview model (2024-12-17 version).
pub const MODEL_GPT4O_REALTIME_PREVIEW_20241217: &str = "gpt-4o-realtime-preview-2024-12-17";
/// GPT-4o mini realtime preview model.
pub const MODEL_GPT4O_MINI_REALTIME_PREVIEW: &str = "gpt-4o-mini-realtime-preview";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = MODEL_GPT4O_REALTIME_PREVIEW_20241001;

// ============================================================================
// Voices, formats, modalities
// ============================================================================

pub const VOICE_ALLOY: &str = "alloy";
pub const VOICE_ECHO: &str = "echo";
pub const VOICE_SHIMMER: &str = "shimmer";

/// 16-bit PCM audio at 24kHz, mono, little-endian.
pub const AUDIO_FORMAT_PCM16: &str = "pcm16";

pub const MODALITY_TEXT: &str = "text";
pub const MODALITY_AUDIO: &str = "audio";

pub const TOOL_CHOICE_AUTO: &str = "auto";

/// Transcription model for user audio.
pub const TRANSCRIPTION_WHISPER_1: &str = "whisper-1";

// ============================================================================
// Configuration Types
// ============================================================================

/// Configuration for establishing a realtime connection.
#[derive(Debug, Clone, Default)]
pub struct ConnectConfig {
    /// Model ID to use. Empty means [`DEFAULT_MODEL`].
    pub model: String,
}

/// Session parameters sent with `session.update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Output modalities, e.g. ["text", "audio"].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modalities: Vec<String>,

    /// System prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Voice ID for audio output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_audio_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_audio_format: Option<String>,

    /// Input audio transcription config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_audio_transcription: Option<TranscriptionConfig>,

    /// Voice activity detection. None keeps the server default (server_vad).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_detection: Option<TurnDetection>,

    /// Available function tools.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,

    /// Tool choice: "auto", "none", "required".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,

    /// Sampling temperature (0.6-1.2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Transcription configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    pub model: String,
}

/// Server-side voice activity detection configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnDetection {
    /// Always "server_vad".
    #[serde(rename = "type")]
    pub detection_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_padding_ms: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silence_duration_ms: Option<u32>,
}

/// Function tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool type. Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,

    /// Function name.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema for function parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl Tool {
    /// Creates a new function tool.
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            tool_type: "function".to_string(),
            name: name.into(),
            description: None,
            parameters: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the parameters schema.
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Per-response overrides sent with `response.create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseCreateOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modalities: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

// ============================================================================
// Resource Types
// ============================================================================

/// Session state returned by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionResource {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub voice: String,
}

/// Conversation item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// "message", "function_call", "function_call_output"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    /// "user", "assistant", "system"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ConversationItem {
    /// Creates a user text message item.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            item_type: Some("message".to_string()),
            role: Some("user".to_string()),
            content: vec![ContentPart {
                content_type: Some("input_text".to_string()),
                text: Some(text.into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    /// Creates a function call output item.
    pub fn function_call_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            item_type: Some("function_call_output".to_string()),
            call_id: Some(call_id.into()),
            output: Some(output.into()),
            ..Default::default()
        }
    }

    /// Concatenated text of all text-bearing content parts.
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|p| p.text.as_deref().or(p.transcript.as_deref()))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.concat())
        }
    }
}

/// Content part of a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    /// "input_text", "input_audio", "text", "audio"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

/// Response resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseResource {
    #[serde(default)]
    pub id: String,
    /// "in_progress", "completed", "cancelled", "incomplete", "failed"
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub output: Vec<ConversationItem>,
}
