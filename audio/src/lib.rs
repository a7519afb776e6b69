//! Audio primitives for skytalk.
//!
//! - `pcm`: 16-bit PCM format description and sample conversion
//! - `device`: blocking device traits (`AudioSource`, `OutputDevice`)
//! - `portaudio`: PortAudio-backed implementations of those traits
//!
//! # Example
//!
//! ```rust
//! use skytalk_audio::Format;
//! use std::time::Duration;
//!
//! let format = Format::MONO_24K;
//! assert_eq!(format.bytes_in_duration(Duration::from_millis(20)), 960);
//! assert_eq!(format.frame_bytes(skytalk_audio::FRAME_SAMPLES), 2048);
//! ```

pub mod device;
pub mod pcm;
pub mod portaudio;

pub use device::{AudioSource, OutputDevice, ReadAbort};
pub use pcm::Format;

/// Sample frames per device buffer used across the engine (~42.7ms at 24kHz).
pub const FRAME_SAMPLES: usize = 1024;
