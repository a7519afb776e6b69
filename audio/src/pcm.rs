//! PCM audio format description.
//!
//! Only 16-bit signed little-endian samples are supported; the format is
//! fully described by sample rate and channel count.

use std::time::Duration;

/// Describes a 16-bit signed PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Sample rate in Hz (e.g., 16000, 24000).
    pub sample_rate: u32,
    /// True for stereo (2 channels), false for mono (1 channel).
    pub stereo: bool,
}

impl Format {
    /// Creates a mono format with the given sample rate.
    pub const fn mono(sample_rate: u32) -> Self {
        Self { sample_rate, stereo: false }
    }

    /// Creates a stereo format with the given sample rate.
    pub const fn stereo(sample_rate: u32) -> Self {
        Self { sample_rate, stereo: true }
    }

    /// Returns the number of channels (1 for mono, 2 for stereo).
    pub fn channels(&self) -> u32 {
        if self.stereo { 2 } else { 1 }
    }

    /// Returns the number of bytes per sample frame.
    pub fn sample_bytes(&self) -> usize {
        if self.stereo { 4 } else { 2 }
    }

    /// Returns the number of bytes per second of audio.
    pub fn bytes_rate(&self) -> u64 {
        self.sample_rate as u64 * self.sample_bytes() as u64
    }

    /// Returns the number of bytes needed to hold `duration` of audio.
    pub fn bytes_in_duration(&self, duration: Duration) -> u64 {
        let frames = self.sample_rate as u128 * duration.as_nanos() / 1_000_000_000;
        frames as u64 * self.sample_bytes() as u64
    }

    /// Returns the playback duration of `bytes` of audio.
    pub fn duration(&self, bytes: u64) -> Duration {
        let frames = bytes / self.sample_bytes() as u64;
        Duration::from_nanos(frames * 1_000_000_000 / self.sample_rate as u64)
    }

    /// Returns the size in bytes of a buffer of `frames` sample frames.
    pub fn frame_bytes(&self, frames: usize) -> usize {
        frames * self.sample_bytes()
    }
}

impl Format {
    /// 16kHz mono
    pub const MONO_16K: Format = Format::mono(16000);
    /// 24kHz mono, the realtime API's pcm16 format
    pub const MONO_24K: Format = Format::mono(24000);
}

/// Converts i16 samples to little-endian bytes.
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    bytes
}

/// Converts little-endian bytes to i16 samples. A trailing odd byte is ignored.
pub fn bytes_to_samples(data: &[u8]) -> Vec<i16> {
    data.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_channels() {
        assert_eq!(Format::mono(24000).channels(), 1);
        assert_eq!(Format::stereo(48000).channels(), 2);
        assert_eq!(Format::stereo(48000).sample_bytes(), 4);
    }

    #[test]
    fn test_realtime_frame() {
        let format = Format::MONO_24K;
        assert_eq!(format.frame_bytes(1024), 2048);
        // 1024 frames at 24kHz is just under 43ms
        let d = format.duration(2048);
        assert_eq!(d.as_millis(), 42);
    }

    #[test]
    fn test_bytes_in_duration() {
        let format = Format::MONO_24K;
        assert_eq!(format.bytes_in_duration(Duration::from_secs(1)), 48000);
        assert_eq!(format.bytes_in_duration(Duration::from_millis(100)), 4800);
        assert_eq!(Format::MONO_16K.bytes_rate(), 32000);
    }

    #[test]
    fn test_sample_conversion() {
        let samples = vec![0i16, 1, -1, i16::MAX, i16::MIN];
        let bytes = samples_to_bytes(&samples);
        assert_eq!(bytes.len(), 10);
        assert_eq!(&bytes[2..4], &[1, 0]);
        assert_eq!(bytes_to_samples(&bytes), samples);
        assert_eq!(bytes_to_samples(&[1, 0, 7]), vec![1]);
    }
}
