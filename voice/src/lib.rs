//! Realtime voice session engine.
//!
//! Streams microphone audio to the Realtime API, plays synthesized speech
//! as it arrives, stops playback the moment the user talks over it, and
//! answers the model's function calls from a [`skytalk_timeline::FeedProvider`].
//!
//! - `sink` / `playback`: bounded playback queue and its consumer thread
//! - `capture`: microphone reader thread
//! - `bridge`: function-call execution
//! - `controller`: connection lifecycle and event routing
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use skytalk_realtime::Client;
//! use skytalk_timeline::Snapshot;
//! use skytalk_voice::{Devices, FunctionBridge, SessionController, VoiceConfig};
//!
//! # async fn run(devices: Devices) -> anyhow::Result<()> {
//! let client = Client::new("sk-...")?;
//! let bridge = FunctionBridge::new(Arc::new(Snapshot::default()));
//! let (controller, handle) = SessionController::new(VoiceConfig::default(), bridge);
//!
//! tokio::spawn({
//!     let handle = handle.clone();
//!     async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         handle.stop();
//!     }
//! });
//! controller.run(client.connect_websocket(None), devices).await?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod playback;
pub mod sink;
pub mod turn;

pub use bridge::{FunctionBridge, FunctionResult, FunctionStatus, GET_PAGE_SUMMARY, GET_POST_DETAIL};
pub use capture::CaptureTransmitter;
pub use config::{VoiceConfig, DEFAULT_INSTRUCTIONS, DEFAULT_PLAYBACK_QUEUE};
pub use controller::{Devices, PendingFunctionCall, SessionController, SessionHandle, SessionState};
pub use error::{Result, VoiceError};
pub use event::{InboundEvent, OutboundMessage};
pub use playback::PlaybackConsumer;
pub use sink::{AudioSink, PlaybackItem, TryEnqueue};
pub use turn::TurnTracker;
