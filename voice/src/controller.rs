//! The session controller: lifecycle, event routing, barge-in and
//! function-call dispatch.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use skytalk_audio::{AudioSource, Format, OutputDevice, FRAME_SAMPLES};
use skytalk_realtime::{Error as RealtimeError, ResponseCreateOptions, Session};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::bridge::{FunctionBridge, FunctionResult};
use crate::capture::CaptureTransmitter;
use crate::config::VoiceConfig;
use crate::error::Result;
use crate::event::{InboundEvent, OutboundMessage};
use crate::playback::PlaybackConsumer;
use crate::sink::TryEnqueue;
use crate::turn::TurnTracker;

/// Lifecycle of a voice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Configuring,
    Active,
    Closing,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Connecting => "connecting",
            SessionState::Configuring => "configuring",
            SessionState::Active => "active",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// The audio devices a session takes ownership of.
pub struct Devices {
    pub input: Box<dyn AudioSource>,
    pub output: Box<dyn OutputDevice>,
}

impl Devices {
    fn release(mut self) {
        if let Err(e) = self.input.close() {
            warn!(error = %e, "failed to close input device");
        }
        if let Err(e) = self.output.close() {
            warn!(error = %e, "failed to close output device");
        }
    }
}

/// Control surface for a running session. Cheap to clone; safe to use from
/// signal handlers and other threads.
#[derive(Clone)]
pub struct SessionHandle {
    stop: CancellationToken,
    state: watch::Receiver<SessionState>,
    text: mpsc::UnboundedSender<String>,
}

impl SessionHandle {
    /// Requests a graceful shutdown. Repeated calls are no-ops.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Injects a typed user message. Returns false once the session is gone.
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.text.send(text.into()).is_ok()
    }

    /// Waits until the session reached [`SessionState::Closed`].
    pub async fn wait_closed(&self) {
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| *s == SessionState::Closed).await;
    }
}

/// A function call waiting for, or undergoing, execution.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFunctionCall {
    pub call_id: String,
    pub name: String,
    pub arguments: String,
    /// The response that issued the call.
    pub response_id: Option<String>,
}

/// Drives one conversation from connect to close.
pub struct SessionController {
    config: VoiceConfig,
    bridge: FunctionBridge,
    stop: CancellationToken,
    state: watch::Sender<SessionState>,
    text: mpsc::UnboundedReceiver<String>,
    frame_bytes: usize,
}

impl SessionController {
    pub fn new(config: VoiceConfig, bridge: FunctionBridge) -> (Self, SessionHandle) {
        let stop = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(SessionState::Connecting);
        let (text_tx, text_rx) = mpsc::unbounded_channel();
        let controller = Self {
            config,
            bridge,
            stop: stop.clone(),
            state: state_tx,
            text: text_rx,
            frame_bytes: Format::MONO_24K.frame_bytes(FRAME_SAMPLES),
        };
        let handle = SessionHandle {
            stop,
            state: state_rx,
            text: text_tx,
        };
        (controller, handle)
    }

    /// Runs the session until it is stopped or the transport fails.
    ///
    /// `connect` opens the transport; the devices are released on every
    /// path out of this function. Returns `Ok` after a requested stop and
    /// `Err(VoiceError::Transport)` when the connection failed or dropped.
    pub async fn run<S, F>(self, connect: F, devices: Devices) -> Result<()>
    where
        S: Session,
        F: Future<Output = skytalk_realtime::Result<S>>,
    {
        let SessionController {
            config,
            bridge,
            stop,
            state,
            text,
            frame_bytes,
        } = self;
        let set_state = |s: SessionState| {
            info!(state = %s, "session state");
            state.send_replace(s);
        };

        set_state(SessionState::Connecting);
        let connected = tokio::select! {
            biased;
            _ = stop.cancelled() => None,
            result = connect => Some(result),
        };
        let session = match connected {
            Some(Ok(session)) => session,
            Some(Err(e)) => {
                error!(error = %e, "connect failed");
                set_state(SessionState::Closing);
                devices.release();
                set_state(SessionState::Closed);
                return Err(e.into());
            }
            None => {
                set_state(SessionState::Closing);
                devices.release();
                set_state(SessionState::Closed);
                return Ok(());
            }
        };

        set_state(SessionState::Configuring);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let capture = Arc::new(CaptureTransmitter::new(devices.input, outbound_tx));
        let playback = match PlaybackConsumer::start(devices.output, config.playback_queue, frame_bytes)
        {
            Ok(playback) => Arc::new(playback),
            Err(e) => {
                error!(error = %e, "failed to start playback");
                set_state(SessionState::Closing);
                capture.stop();
                close_transport(&session).await;
                set_state(SessionState::Closed);
                return Err(e.into());
            }
        };

        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let mut active = ActiveSession {
            session,
            bridge,
            playback,
            backlog: VecDeque::new(),
            capture,
            outbound: outbound_rx,
            text,
            results_tx,
            results: results_rx,
            options: config.response_options(),
            turn: TurnTracker::new(),
            calls: VecDeque::new(),
            in_flight: false,
            session_id: None,
        };

        let mut outcome = active.configure(&config).await;
        if outcome.is_ok() {
            set_state(SessionState::Active);
            outcome = active.run(&stop).await;
        }

        set_state(SessionState::Closing);
        active.close(outcome.is_ok()).await;
        set_state(SessionState::Closed);
        outcome
    }
}

struct ActiveSession<S> {
    session: S,
    bridge: FunctionBridge,
    playback: Arc<PlaybackConsumer>,
    /// Audio received while the playback queue was full, oldest first.
    backlog: VecDeque<Vec<u8>>,
    capture: Arc<CaptureTransmitter>,
    outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    text: mpsc::UnboundedReceiver<String>,
    results_tx: mpsc::UnboundedSender<(PendingFunctionCall, FunctionResult)>,
    results: mpsc::UnboundedReceiver<(PendingFunctionCall, FunctionResult)>,
    options: ResponseCreateOptions,
    turn: TurnTracker,
    calls: VecDeque<PendingFunctionCall>,
    in_flight: bool,
    session_id: Option<String>,
}

impl<S: Session> ActiveSession<S> {
    async fn configure(&mut self, config: &VoiceConfig) -> Result<()> {
        self.session
            .update_session(&config.session_config(FunctionBridge::tools()))
            .await?;
        self.turn.request();
        self.maybe_create().await?;

        if let Err(e) = self.capture.start() {
            error!(error = %e, "failed to start capture; continuing without microphone");
        }
        Ok(())
    }

    async fn run(&mut self, stop: &CancellationToken) -> Result<()> {
        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => {
                    info!("stop requested");
                    return Ok(());
                }
                Some((call, result)) = self.results.recv() => {
                    self.on_function_result(call, result).await?;
                }
                Some(msg) = self.outbound.recv() => {
                    self.session.send(msg.into()).await?;
                }
                Some(text) = self.text.recv() => {
                    info!(text = %text, "user (typed)");
                    self.session.add_user_message(&text).await?;
                    self.turn.request();
                    self.maybe_create().await?;
                }
                _ = self.playback.space_available(), if !self.backlog.is_empty() => {
                    self.drain_backlog();
                }
                event = self.session.recv() => match event {
                    None => {
                        return Err(RealtimeError::Connection("connection closed by server".into()).into());
                    }
                    Some(Ok(event)) => match InboundEvent::from_server(event) {
                        Ok(inbound) => self.on_event(inbound).await?,
                        Err(e) => warn!(error = %e, "skipping event"),
                    },
                    Some(Err(e)) if e.is_transport() => return Err(e.into()),
                    Some(Err(RealtimeError::Api(api))) => {
                        warn!(
                            error_type = ?api.error_type,
                            code = ?api.code,
                            message = %api.message,
                            "server error"
                        );
                        self.turn.on_error();
                        self.maybe_create().await?;
                    }
                    Some(Err(e)) => warn!(error = %e, "protocol error"),
                },
            }
        }
    }

    async fn on_event(&mut self, event: InboundEvent) -> Result<()> {
        match event {
            InboundEvent::SessionCreated { session_id } => {
                info!(session_id = %session_id, "session created");
                self.session_id = Some(session_id);
            }
            InboundEvent::SessionUpdated => debug!("session updated"),
            InboundEvent::SpeechStarted => {
                debug!(held = self.backlog.len(), "speech started; interrupting playback");
                self.backlog.clear();
                let playback = self.playback.clone();
                match tokio::task::spawn_blocking(move || playback.interrupt()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "playback reset failed"),
                    Err(e) => warn!(error = %e, "playback reset task failed"),
                }
            }
            InboundEvent::AudioDelta(pcm) => {
                self.backlog.push_back(pcm);
                self.drain_backlog();
            }
            InboundEvent::TranscriptDone(transcript) => {
                info!(transcript = %transcript, "assistant");
            }
            InboundEvent::UserTranscript(transcript) => {
                info!(transcript = %transcript, "user");
            }
            InboundEvent::OutputItemAdded { text: Some(text) } => {
                info!(text = %text, "assistant text");
            }
            InboundEvent::OutputItemAdded { text: None } => {}
            InboundEvent::FunctionCallDone {
                call_id,
                name,
                arguments,
                response_id,
            } => {
                info!(call_id = %call_id, function = %name, arguments = %arguments, "function call");
                self.calls.push_back(PendingFunctionCall {
                    call_id,
                    name,
                    arguments,
                    response_id,
                });
                self.pump_calls();
            }
            InboundEvent::ResponseCreated { response_id } => {
                debug!(response_id = ?response_id, "response created");
                self.turn.on_response_created();
            }
            InboundEvent::ResponseDone {
                response_id,
                status,
            } => {
                debug!(response_id = ?response_id, status = ?status, "response done");
                self.turn.on_response_done();
                self.maybe_create().await?;
            }
            InboundEvent::Unknown(kind) => debug!(kind = %kind, "ignored event"),
        }
        Ok(())
    }

    /// Moves held audio into the playback queue until it is full. The event
    /// loop never waits on the queue, so a barge-in is seen right away.
    fn drain_backlog(&mut self) {
        while let Some(pcm) = self.backlog.pop_front() {
            match self.playback.try_enqueue(pcm) {
                TryEnqueue::Queued => {}
                TryEnqueue::Full(item) => {
                    self.backlog.push_front(item.pcm);
                    return;
                }
                TryEnqueue::Dropped => {
                    debug!(dropped = self.backlog.len() + 1, "audio dropped");
                    self.backlog.clear();
                    return;
                }
            }
        }
    }

    /// Starts the next queued call unless one is already running.
    fn pump_calls(&mut self) {
        if self.in_flight {
            return;
        }
        let Some(call) = self.calls.pop_front() else {
            return;
        };
        self.in_flight = true;
        let bridge = self.bridge.clone();
        let results = self.results_tx.clone();
        let (name, arguments) = (call.name.clone(), call.arguments.clone());
        let task = tokio::spawn(async move { bridge.execute(&name, &arguments).await });
        tokio::spawn(async move {
            // A panicking provider still has to release the call slot.
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    error!(
                        call_id = %call.call_id,
                        function = %call.name,
                        error = %e,
                        "function task failed"
                    );
                    FunctionResult::error(format!("Function {} failed", call.name))
                }
            };
            let _ = results.send((call, result));
        });
    }

    async fn on_function_result(
        &mut self,
        call: PendingFunctionCall,
        result: FunctionResult,
    ) -> Result<()> {
        self.in_flight = false;
        info!(
            call_id = %call.call_id,
            function = %call.name,
            status = ?result.status,
            "function result"
        );
        self.session
            .add_function_call_output(&call.call_id, &result.to_output())
            .await?;
        self.turn.request();
        self.pump_calls();
        self.maybe_create().await
    }

    /// Sends the pending `response.create` if nothing blocks it.
    async fn maybe_create(&mut self) -> Result<()> {
        if self.in_flight || !self.calls.is_empty() {
            return Ok(());
        }
        if self.turn.take_create() {
            self.session.create_response(Some(&self.options)).await?;
        }
        Ok(())
    }

    /// Tears down both pipelines and the transport. `transport_alive`
    /// decides whether capture's final messages are still forwarded.
    async fn close(&mut self, transport_alive: bool) {
        let capture = self.capture.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || capture.stop()).await {
            warn!(error = %e, "capture shutdown task failed");
        }

        let mut forwarded = 0usize;
        while let Ok(msg) = self.outbound.try_recv() {
            if !transport_alive {
                continue;
            }
            if let Err(e) = self.session.send(msg.into()).await {
                warn!(error = %e, "failed to flush outbound audio");
                break;
            }
            forwarded += 1;
        }
        debug!(forwarded, "outbound drained");

        let playback = self.playback.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || playback.stop()).await {
            warn!(error = %e, "playback shutdown task failed");
        }

        close_transport(&self.session).await;
        if let Some(id) = self.session_id.take() {
            info!(session_id = %id, "session closed");
        }
    }
}

/// Closes the transport. A failure is logged and reported as false; the
/// session is over either way.
async fn close_transport<S: Session>(session: &S) -> bool {
    match session.close().await {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "transport close");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skytalk_realtime::{ClientEvent, ServerEvent};

    struct Unclosable;

    #[async_trait::async_trait]
    impl Session for Unclosable {
        async fn send(&self, _event: ClientEvent) -> skytalk_realtime::Result<()> {
            Ok(())
        }

        async fn recv(&mut self) -> Option<skytalk_realtime::Result<ServerEvent>> {
            None
        }

        async fn close(&self) -> skytalk_realtime::Result<()> {
            Err(RealtimeError::Connection("reset by peer".into()))
        }
    }

    #[tokio::test]
    async fn test_close_transport_reports_failure() {
        assert!(!close_transport(&Unclosable).await);
    }
}
