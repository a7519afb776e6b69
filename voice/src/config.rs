//! Session settings for the voice engine.

use serde::{Deserialize, Serialize};
use skytalk_realtime::{
    ResponseCreateOptions, SessionConfig, Tool, TranscriptionConfig, AUDIO_FORMAT_PCM16,
    MODALITY_AUDIO, MODALITY_TEXT, TOOL_CHOICE_AUTO, TRANSCRIPTION_WHISPER_1, VOICE_ECHO,
};

/// Default system prompt.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant designed to catch the user up on their bluesky timeline. \
You speak quickly and casually, very cheerful and with lots of emotion appropriate to the context.\n\
You have access to the following functions:\n\
1. get_page_summary(page: int): Returns a summary of the posts on the given page number.\n\
2. get_post_detail(post_number: int): Returns detailed information about the post with the given post number.\n\
Start by getting the first page and then summarizing anything interesting in it. Keep your answers concise be curious.";

/// Default capacity of the playback queue, in audio chunks.
pub const DEFAULT_PLAYBACK_QUEUE: usize = 256;

/// Voice engine settings, usually the `voice:` section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Voice ID for synthesized speech.
    pub voice: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// System prompt, also sent with every response request.
    pub instructions: String,
    /// Transcription model for the user's speech. Empty disables transcription.
    pub transcription_model: String,
    /// Capacity of the playback queue.
    pub playback_queue: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice: VOICE_ECHO.to_string(),
            temperature: 0.7,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            transcription_model: TRANSCRIPTION_WHISPER_1.to_string(),
            playback_queue: DEFAULT_PLAYBACK_QUEUE,
        }
    }
}

impl VoiceConfig {
    /// Builds the `session.update` payload for the given tools.
    pub fn session_config(&self, tools: Vec<Tool>) -> SessionConfig {
        SessionConfig {
            modalities: modalities(),
            instructions: Some(self.instructions.clone()),
            voice: Some(self.voice.clone()),
            input_audio_format: Some(AUDIO_FORMAT_PCM16.to_string()),
            output_audio_format: Some(AUDIO_FORMAT_PCM16.to_string()),
            input_audio_transcription: (!self.transcription_model.is_empty()).then(|| {
                TranscriptionConfig {
                    model: self.transcription_model.clone(),
                }
            }),
            turn_detection: None,
            tools,
            tool_choice: Some(TOOL_CHOICE_AUTO.to_string()),
            temperature: Some(self.temperature),
        }
    }

    /// Options sent with every `response.create`.
    pub fn response_options(&self) -> ResponseCreateOptions {
        ResponseCreateOptions {
            modalities: modalities(),
            instructions: Some(self.instructions.clone()),
        }
    }
}

fn modalities() -> Vec<String> {
    vec![MODALITY_TEXT.to_string(), MODALITY_AUDIO.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VoiceConfig::default();
        let session = config.session_config(vec![Tool::function("f")]);
        assert_eq!(session.voice.as_deref(), Some("echo"));
        assert_eq!(session.temperature, Some(0.7));
        assert_eq!(session.tool_choice.as_deref(), Some("auto"));
        assert_eq!(
            session.input_audio_transcription.map(|t| t.model),
            Some("whisper-1".to_string())
        );
        assert_eq!(session.modalities, vec!["text", "audio"]);
        assert_eq!(config.response_options().instructions, session.instructions);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: VoiceConfig =
            serde_json::from_str(r#"{"voice": "alloy", "transcription_model": ""}"#).unwrap();
        assert_eq!(config.voice, "alloy");
        assert_eq!(config.playback_queue, DEFAULT_PLAYBACK_QUEUE);
        assert!(config.session_config(Vec::new()).input_audio_transcription.is_none());
    }
}
