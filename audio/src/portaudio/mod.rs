//! Audio capture and playback via PortAudio.
//!
//! - Blocking I/O model: `Stream::read` and `Stream::write` block
//! - Uses int16 (paInt16) sample format
//! - Links against the system portaudio library when the build script finds
//!   it; otherwise every call fails with "portaudio library not linked"
//!
//! # Example
//!
//! ```ignore
//! use skytalk_audio::{portaudio, AudioSource, Format};
//!
//! let mut mic = portaudio::open_input(Format::MONO_24K, 1024)?;
//! let frame = mic.read_frame()?;
//! mic.close()?;
//! ```

#[cfg(portaudio_linked)]
pub(crate) mod ffi;
#[cfg(not(portaudio_linked))]
#[path = "ffi_stub.rs"]
pub(crate) mod ffi;

use std::ffi::CStr;
use std::io;
use std::ptr;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::device::{AudioSource, OutputDevice, ReadAbort};
use crate::pcm::{self, Format};

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initializes PortAudio once per process.
fn initialize() -> io::Result<()> {
    let result = INIT.get_or_init(|| {
        let err = unsafe { ffi::Pa_Initialize() };
        if err == ffi::PA_NO_ERROR {
            Ok(())
        } else {
            Err(pa_error_string(err))
        }
    });
    result.clone().map_err(io::Error::other)
}

fn pa_error_string(code: ffi::PaError) -> String {
    unsafe {
        let ptr = ffi::Pa_GetErrorText(code);
        if ptr.is_null() {
            return format!("portaudio error {}", code);
        }
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

fn pa_check(code: ffi::PaError) -> io::Result<()> {
    if code == ffi::PA_NO_ERROR {
        Ok(())
    } else {
        Err(io::Error::other(pa_error_string(code)))
    }
}

/// Information about an audio device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub max_input_channels: u32,
    pub max_output_channels: u32,
    pub default_sample_rate: f64,
    pub is_default_input: bool,
    pub is_default_output: bool,
}

/// Configuration for opening an audio stream.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub input_channels: u32,
    pub output_channels: u32,
    pub sample_rate: f64,
    pub frames_per_buffer: usize,
}

fn device_info(index: ffi::PaDeviceIndex) -> Option<DeviceInfo> {
    let info = unsafe { ffi::Pa_GetDeviceInfo(index) };
    if info.is_null() {
        return None;
    }
    let info = unsafe { &*info };
    let name = unsafe { CStr::from_ptr(info.name) }
        .to_string_lossy()
        .into_owned();
    let (default_input, default_output) =
        unsafe { (ffi::Pa_GetDefaultInputDevice(), ffi::Pa_GetDefaultOutputDevice()) };

    Some(DeviceInfo {
        index: index as usize,
        name,
        max_input_channels: info.max_input_channels.max(0) as u32,
        max_output_channels: info.max_output_channels.max(0) as u32,
        default_sample_rate: info.default_sample_rate,
        is_default_input: index == default_input,
        is_default_output: index == default_output,
    })
}

/// Lists available audio devices.
pub fn list_devices() -> io::Result<Vec<DeviceInfo>> {
    initialize()?;

    let count = unsafe { ffi::Pa_GetDeviceCount() };
    if count < 0 {
        return Err(io::Error::other(pa_error_string(count)));
    }

    Ok((0..count).filter_map(device_info).collect())
}

/// A blocking audio stream for capture and/or playback.
pub struct Stream {
    pa_stream: *mut std::os::raw::c_void,
    config: StreamConfig,
    started: bool,
    closed: bool,
    /// True until the stream is closed; shared with [`StreamAbort`].
    open: Arc<Mutex<bool>>,
}

// The raw stream pointer is only touched through &mut self or by the single
// thread that owns the Stream, except for StreamAbort which holds `open`.
unsafe impl Send for Stream {}

/// Aborts a stream from another thread so a blocked read returns.
pub struct StreamAbort {
    pa_stream: *mut std::os::raw::c_void,
    open: Arc<Mutex<bool>>,
}

// The pointer is only used while `open` is locked and true; Stream::close
// clears it under the same lock before freeing the stream.
unsafe impl Send for StreamAbort {}
unsafe impl Sync for StreamAbort {}

impl ReadAbort for StreamAbort {
    fn abort(&self) {
        let open = self.open.lock();
        if !*open {
            return;
        }
        let err = unsafe { ffi::Pa_AbortStream(self.pa_stream) };
        if err != ffi::PA_NO_ERROR {
            tracing::debug!(error = %pa_error_string(err), "stream abort");
        }
    }
}

impl Stream {
    /// Starts the audio stream. Starting a running stream is a no-op.
    pub fn start(&mut self) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::other("stream closed"));
        }
        if self.started {
            return Ok(());
        }
        pa_check(unsafe { ffi::Pa_StartStream(self.pa_stream) })?;
        self.started = true;
        Ok(())
    }

    /// Stops the audio stream, discarding pending output.
    pub fn stop(&mut self) -> io::Result<()> {
        if self.closed || !self.started {
            return Ok(());
        }
        self.started = false;
        pa_check(unsafe { ffi::Pa_AbortStream(self.pa_stream) })
    }

    /// Closes the audio stream and frees resources.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let mut open = self.open.lock();
        *open = false;
        unsafe {
            if self.started {
                ffi::Pa_AbortStream(self.pa_stream);
            }
            pa_check(ffi::Pa_CloseStream(self.pa_stream))
        }
    }

    /// Reads one buffer of audio samples from an input stream.
    ///
    /// Returns `frames_per_buffer` samples per channel as i16.
    pub fn read(&mut self) -> io::Result<Vec<i16>> {
        if self.closed {
            return Err(io::Error::other("stream closed"));
        }
        if self.config.input_channels == 0 {
            return Err(io::Error::other("no input channels"));
        }

        let n = self.config.frames_per_buffer * self.config.input_channels as usize;
        let mut samples = vec![0i16; n];
        let err = unsafe {
            ffi::Pa_ReadStream(
                self.pa_stream,
                samples.as_mut_ptr() as *mut _,
                self.config.frames_per_buffer as std::os::raw::c_ulong,
            )
        };
        // Input overflow only means samples were dropped before this read.
        if err != ffi::PA_INPUT_OVERFLOWED {
            pa_check(err)?;
        }
        Ok(samples)
    }

    /// Writes audio samples to an output stream.
    pub fn write(&mut self, samples: &[i16]) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::other("stream closed"));
        }
        if self.config.output_channels == 0 {
            return Err(io::Error::other("no output channels"));
        }

        let frames = samples.len() / self.config.output_channels as usize;
        let err = unsafe {
            ffi::Pa_WriteStream(
                self.pa_stream,
                samples.as_ptr() as *const _,
                frames as std::os::raw::c_ulong,
            )
        };
        // Underflow only means the device ran dry before this write.
        if err != ffi::PA_OUTPUT_UNDERFLOWED {
            pa_check(err)?;
        }
        Ok(())
    }

    /// Returns a handle that aborts this stream from another thread.
    pub fn abort_handle(&self) -> StreamAbort {
        StreamAbort {
            pa_stream: self.pa_stream,
            open: self.open.clone(),
        }
    }

    /// Returns the stream configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Opens an audio stream on the default devices with the given configuration.
pub fn open_stream(config: StreamConfig) -> io::Result<Stream> {
    initialize()?;

    let input_params = if config.input_channels > 0 {
        Some(stream_parameters(
            unsafe { ffi::Pa_GetDefaultInputDevice() },
            config.input_channels,
            true,
        )?)
    } else {
        None
    };
    let output_params = if config.output_channels > 0 {
        Some(stream_parameters(
            unsafe { ffi::Pa_GetDefaultOutputDevice() },
            config.output_channels,
            false,
        )?)
    } else {
        None
    };

    let mut pa_stream: *mut std::os::raw::c_void = ptr::null_mut();
    pa_check(unsafe {
        ffi::Pa_OpenStream(
            &mut pa_stream,
            input_params.as_ref().map_or(ptr::null(), |p| p as *const _),
            output_params.as_ref().map_or(ptr::null(), |p| p as *const _),
            config.sample_rate,
            config.frames_per_buffer as std::os::raw::c_ulong,
            ffi::PA_CLIP_OFF,
            ptr::null(),
            ptr::null_mut(),
        )
    })?;

    Ok(Stream {
        pa_stream,
        config,
        started: false,
        closed: false,
        open: Arc::new(Mutex::new(true)),
    })
}

fn stream_parameters(
    device: ffi::PaDeviceIndex,
    channels: u32,
    input: bool,
) -> io::Result<ffi::PaStreamParameters> {
    if device == ffi::PA_NO_DEVICE {
        let which = if input { "input" } else { "output" };
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no default {} device", which),
        ));
    }
    let info = unsafe { ffi::Pa_GetDeviceInfo(device) };
    if info.is_null() {
        return Err(io::Error::other("failed to get device info"));
    }
    let latency = unsafe {
        if input {
            (*info).default_low_input_latency
        } else {
            (*info).default_low_output_latency
        }
    };
    Ok(ffi::PaStreamParameters {
        device,
        channel_count: channels as std::os::raw::c_int,
        sample_format: ffi::PA_INT16,
        suggested_latency: latency,
        host_api_specific_stream_info: ptr::null_mut(),
    })
}

/// Microphone input producing `frames_per_buffer`-sized frames.
pub struct Input {
    stream: Stream,
}

/// Speaker output.
pub struct Output {
    stream: Stream,
}

/// Opens and starts the default input device.
pub fn open_input(format: Format, frames_per_buffer: usize) -> io::Result<Input> {
    let mut stream = open_stream(StreamConfig {
        input_channels: format.channels(),
        output_channels: 0,
        sample_rate: format.sample_rate as f64,
        frames_per_buffer,
    })?;
    stream.start()?;
    tracing::debug!(sample_rate = format.sample_rate, frames_per_buffer, "audio input opened");
    Ok(Input { stream })
}

/// Opens and starts the default output device.
pub fn open_output(format: Format, frames_per_buffer: usize) -> io::Result<Output> {
    let mut stream = open_stream(StreamConfig {
        input_channels: 0,
        output_channels: format.channels(),
        sample_rate: format.sample_rate as f64,
        frames_per_buffer,
    })?;
    stream.start()?;
    tracing::debug!(sample_rate = format.sample_rate, frames_per_buffer, "audio output opened");
    Ok(Output { stream })
}

impl AudioSource for Input {
    fn read_frame(&mut self) -> io::Result<Vec<u8>> {
        let samples = self.stream.read()?;
        Ok(pcm::samples_to_bytes(&samples))
    }

    fn close(&mut self) -> io::Result<()> {
        self.stream.close()
    }

    fn abort_handle(&self) -> Option<Arc<dyn ReadAbort>> {
        Some(Arc::new(self.stream.abort_handle()))
    }
}

impl OutputDevice for Output {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write(&pcm::bytes_to_samples(data))
    }

    fn stop(&mut self) -> io::Result<()> {
        self.stream.stop()
    }

    fn start(&mut self) -> io::Result<()> {
        self.stream.start()
    }

    fn close(&mut self) -> io::Result<()> {
        self.stream.close()
    }
}
