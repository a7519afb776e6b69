//! WebSocket-based realtime session.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream, StreamExt};
use futures::SinkExt;
use http::HeaderValue;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, warn};

use crate::client::ClientConfig;
use crate::error::{Error, Result};
use crate::event::*;
use crate::session::Session;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Capacity of the inbound and outbound message channels.
const CHANNEL_CAPACITY: usize = 100;

/// WebSocket-based realtime session.
///
/// A read task parses server frames (decoding audio deltas off the caller's
/// loop) and a write task owns the socket's sink; both talk to the session
/// through channels.
#[derive(Debug)]
pub struct WebSocketSession {
    write_tx: mpsc::Sender<Message>,
    event_rx: mpsc::Receiver<Result<ServerEvent>>,
    session_id: Option<String>,
    _read_handle: tokio::task::JoinHandle<()>,
    _write_handle: tokio::task::JoinHandle<()>,
}

impl WebSocketSession {
    /// Connects to the Realtime API via WebSocket.
    pub(crate) async fn connect(config: Arc<ClientConfig>, model: &str) -> Result<Self> {
        let url = format!("{}?model={}", config.ws_url, model);
        debug!(url = %url, "connecting");

        let mut request = url.as_str().into_client_request()?;
        let headers = request.headers_mut();
        headers.insert("Authorization", header_value(&format!("Bearer {}", config.api_key))?);
        headers.insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));
        if let Some(ref org) = config.organization {
            headers.insert("OpenAI-Organization", header_value(org)?);
        }

        let (ws_stream, _response) = connect_async(request)
            .await
            .map_err(|e| Error::Connection(format!("failed to connect: {}", e)))?;

        let (write, read) = ws_stream.split();

        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (write_tx, write_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let write_handle = tokio::spawn(write_loop(write, write_rx));
        let read_handle = tokio::spawn(read_loop(read, event_tx));

        Ok(Self {
            write_tx,
            event_rx,
            session_id: None,
            _read_handle: read_handle,
            _write_handle: write_handle,
        })
    }
}

#[async_trait]
impl Session for WebSocketSession {
    async fn send(&self, event: ClientEvent) -> Result<()> {
        let text = event.to_json(&generate_event_id())?;
        if event.event_type() != EVENT_TYPE_INPUT_AUDIO_BUFFER_APPEND {
            debug!(event = %truncate_for_log(&text, 500), "sending");
        }
        self.write_tx
            .send(Message::Text(text.into()))
            .await
            .map_err(|_| Error::SessionClosed)
    }

    async fn recv(&mut self) -> Option<Result<ServerEvent>> {
        let result = self.event_rx.recv().await?;

        if let Ok(ref event) = result {
            if event.event_type == EVENT_TYPE_SESSION_CREATED {
                if let Some(ref session) = event.session {
                    self.session_id = Some(session.id.clone());
                }
            }
        }

        Some(result)
    }

    async fn close(&self) -> Result<()> {
        // The write task may already be gone; closing twice is fine.
        let _ = self.write_tx.send(Message::Close(None)).await;
        Ok(())
    }

    fn session_id(&self) -> Option<String> {
        self.session_id.clone()
    }
}

async fn write_loop(mut write: SplitSink<WsStream, Message>, mut rx: mpsc::Receiver<Message>) {
    while let Some(msg) = rx.recv().await {
        if let Message::Close(_) = msg {
            let _ = write.close().await;
            break;
        }
        if let Err(e) = write.send(msg).await {
            error!(error = %e, "websocket write failed");
            break;
        }
    }
}

async fn read_loop(mut read: SplitStream<WsStream>, tx: mpsc::Sender<Result<ServerEvent>>) {
    while let Some(result) = read.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let event = parse_event(&text);
                match &event {
                    Ok(ev) if ev.is_audio_delta() => {}
                    Ok(ev) => debug!(event_type = %ev.event_type, "received"),
                    Err(e) => warn!(error = %e, "received"),
                }
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(frame)) => {
                debug!(?frame, "websocket closed by server");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "websocket read failed");
                let _ = tx.send(Err(Error::WebSocket(e))).await;
                break;
            }
        }
    }
    // Dropping tx ends the session's recv stream.
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidConfig(format!("invalid header value: {}", e)))
}

fn generate_event_id() -> String {
    format!("evt_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

fn truncate_for_log(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
