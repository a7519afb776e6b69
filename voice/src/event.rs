//! Inbound and outbound messages as seen by the session controller.

use skytalk_realtime::event::*;
use skytalk_realtime::{ClientEvent, ServerEvent};

use crate::error::{Result, VoiceError};

/// A server event the controller acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    SessionCreated { session_id: String },
    SessionUpdated,
    /// The user started talking (barge-in).
    SpeechStarted,
    /// Decoded PCM of synthesized speech.
    AudioDelta(Vec<u8>),
    /// Final transcript of the assistant's spoken response.
    TranscriptDone(String),
    /// Final transcript of the user's speech.
    UserTranscript(String),
    OutputItemAdded { text: Option<String> },
    FunctionCallDone {
        call_id: String,
        name: String,
        arguments: String,
        response_id: Option<String>,
    },
    ResponseCreated { response_id: Option<String> },
    ResponseDone {
        response_id: Option<String>,
        status: Option<String>,
    },
    /// Anything else; ignored.
    Unknown(String),
}

impl InboundEvent {
    /// Classifies a server event.
    ///
    /// Known kinds missing their required fields are protocol errors.
    pub fn from_server(event: ServerEvent) -> Result<Self> {
        let kind = event.event_type.as_str();
        let inbound = match kind {
            EVENT_TYPE_SESSION_CREATED => InboundEvent::SessionCreated {
                session_id: event.session.map(|s| s.id).unwrap_or_default(),
            },
            EVENT_TYPE_SESSION_UPDATED => InboundEvent::SessionUpdated,
            EVENT_TYPE_INPUT_AUDIO_BUFFER_SPEECH_STARTED => InboundEvent::SpeechStarted,
            EVENT_TYPE_RESPONSE_AUDIO_DELTA => match event.audio {
                Some(pcm) => InboundEvent::AudioDelta(pcm),
                None => return Err(VoiceError::protocol("audio delta without decodable audio")),
            },
            EVENT_TYPE_RESPONSE_AUDIO_TRANSCRIPT_DONE => {
                InboundEvent::TranscriptDone(event.transcript.unwrap_or_default())
            }
            EVENT_TYPE_CONVERSATION_ITEM_INPUT_AUDIO_TRANSCRIPTION_COMPLETED => {
                InboundEvent::UserTranscript(event.transcript.unwrap_or_default())
            }
            EVENT_TYPE_RESPONSE_OUTPUT_ITEM_ADDED => InboundEvent::OutputItemAdded {
                text: event.item.as_ref().and_then(|i| i.text()),
            },
            EVENT_TYPE_RESPONSE_FUNCTION_CALL_ARGUMENTS_DONE => {
                let (Some(call_id), Some(name)) = (event.call_id, event.name) else {
                    return Err(VoiceError::protocol("function call without call_id or name"));
                };
                InboundEvent::FunctionCallDone {
                    call_id,
                    name,
                    arguments: event.arguments.unwrap_or_default(),
                    response_id: event.response_id,
                }
            }
            EVENT_TYPE_RESPONSE_CREATED => InboundEvent::ResponseCreated {
                response_id: event.response.map(|r| r.id),
            },
            EVENT_TYPE_RESPONSE_DONE => {
                let (response_id, status) = match event.response {
                    Some(r) => (Some(r.id), Some(r.status)),
                    None => (None, None),
                };
                InboundEvent::ResponseDone { response_id, status }
            }
            _ => InboundEvent::Unknown(event.event_type),
        };
        Ok(inbound)
    }
}

/// Messages the capture thread hands to the controller for sending.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// One base64-encoded PCM frame.
    AppendAudio(String),
    /// End of the user's utterance.
    CommitBuffer,
}

impl From<OutboundMessage> for ClientEvent {
    fn from(msg: OutboundMessage) -> Self {
        match msg {
            OutboundMessage::AppendAudio(audio) => ClientEvent::InputAudioBufferAppend { audio },
            OutboundMessage::CommitBuffer => ClientEvent::InputAudioBufferCommit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skytalk_realtime::parse_event;

    fn inbound(raw: &str) -> Result<InboundEvent> {
        InboundEvent::from_server(parse_event(raw).unwrap())
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            inbound(r#"{"type":"input_audio_buffer.speech_started","audio_start_ms":10}"#).unwrap(),
            InboundEvent::SpeechStarted
        );
        assert_eq!(
            inbound(r#"{"type":"response.audio.delta","delta":"AAE="}"#).unwrap(),
            InboundEvent::AudioDelta(vec![0, 1])
        );
        assert_eq!(
            inbound(r#"{"type":"response.audio_transcript.done","transcript":"hey"}"#).unwrap(),
            InboundEvent::TranscriptDone("hey".into())
        );
        assert_eq!(
            inbound(r#"{"type":"response.done","response":{"id":"r1","status":"completed"}}"#).unwrap(),
            InboundEvent::ResponseDone {
                response_id: Some("r1".into()),
                status: Some("completed".into())
            }
        );
        assert_eq!(
            inbound(r#"{"type":"rate_limits.updated"}"#).unwrap(),
            InboundEvent::Unknown("rate_limits.updated".into())
        );
    }

    #[test]
    fn test_function_call() {
        let event = inbound(
            r#"{"type":"response.function_call_arguments.done","response_id":"r1","call_id":"c1","name":"get_page_summary","arguments":"{\"page\":2}"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            InboundEvent::FunctionCallDone {
                call_id: "c1".into(),
                name: "get_page_summary".into(),
                arguments: r#"{"page":2}"#.into(),
                response_id: Some("r1".into()),
            }
        );

        let missing = inbound(r#"{"type":"response.function_call_arguments.done","name":"x"}"#);
        assert!(matches!(missing, Err(VoiceError::Protocol(_))));
    }

    #[test]
    fn test_bad_audio_is_protocol_error() {
        let missing = inbound(r#"{"type":"response.audio.delta","delta":"!!"}"#);
        assert!(matches!(missing, Err(VoiceError::Protocol(_))));
    }

    #[test]
    fn test_outbound_conversion() {
        assert_eq!(
            ClientEvent::from(OutboundMessage::CommitBuffer),
            ClientEvent::InputAudioBufferCommit
        );
        assert_eq!(
            ClientEvent::from(OutboundMessage::AppendAudio("AAE=".into())),
            ClientEvent::InputAudioBufferAppend {
                audio: "AAE=".into()
            }
        );
    }
}
