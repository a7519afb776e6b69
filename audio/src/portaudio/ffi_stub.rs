//! Stand-in for the PortAudio bindings when the library is not linked.
//!
//! Every entry point reports `PA_NOT_AVAILABLE`, so opening a stream fails
//! with a descriptive error instead of the build failing to link.

#![allow(non_snake_case, clippy::missing_safety_doc)]

use std::os::raw::{c_char, c_double, c_int, c_ulong, c_void};

pub type PaError = c_int;
pub type PaDeviceIndex = c_int;
pub type PaStreamFlags = c_ulong;

pub const PA_NO_ERROR: PaError = 0;
pub const PA_INPUT_OVERFLOWED: PaError = -9981;
pub const PA_OUTPUT_UNDERFLOWED: PaError = -9980;
pub const PA_NO_DEVICE: PaDeviceIndex = -1;

pub const PA_INT16: c_ulong = 0x00000008;
pub const PA_CLIP_OFF: PaStreamFlags = 0x00000001;

const PA_NOT_AVAILABLE: PaError = -10000;

#[repr(C)]
pub struct PaDeviceInfo {
    pub struct_version: c_int,
    pub name: *const c_char,
    pub host_api: c_int,
    pub max_input_channels: c_int,
    pub max_output_channels: c_int,
    pub default_low_input_latency: c_double,
    pub default_low_output_latency: c_double,
    pub default_high_input_latency: c_double,
    pub default_high_output_latency: c_double,
    pub default_sample_rate: c_double,
}

#[repr(C)]
pub struct PaStreamParameters {
    pub device: PaDeviceIndex,
    pub channel_count: c_int,
    pub sample_format: c_ulong,
    pub suggested_latency: c_double,
    pub host_api_specific_stream_info: *mut c_void,
}

pub unsafe fn Pa_Initialize() -> PaError {
    PA_NOT_AVAILABLE
}

pub unsafe fn Pa_GetErrorText(_error_code: PaError) -> *const c_char {
    c"portaudio library not linked into this build".as_ptr()
}

pub unsafe fn Pa_GetDeviceCount() -> PaDeviceIndex {
    PA_NOT_AVAILABLE
}

pub unsafe fn Pa_GetDefaultInputDevice() -> PaDeviceIndex {
    PA_NO_DEVICE
}

pub unsafe fn Pa_GetDefaultOutputDevice() -> PaDeviceIndex {
    PA_NO_DEVICE
}

pub unsafe fn Pa_GetDeviceInfo(_device: PaDeviceIndex) -> *const PaDeviceInfo {
    std::ptr::null()
}

pub unsafe fn Pa_OpenStream(
    _stream: *mut *mut c_void,
    _input_parameters: *const PaStreamParameters,
    _output_parameters: *const PaStreamParameters,
    _sample_rate: c_double,
    _frames_per_buffer: c_ulong,
    _stream_flags: PaStreamFlags,
    _stream_callback: *const c_void,
    _user_data: *mut c_void,
) -> PaError {
    PA_NOT_AVAILABLE
}

pub unsafe fn Pa_StartStream(_stream: *mut c_void) -> PaError {
    PA_NOT_AVAILABLE
}

pub unsafe fn Pa_AbortStream(_stream: *mut c_void) -> PaError {
    PA_NOT_AVAILABLE
}

pub unsafe fn Pa_CloseStream(_stream: *mut c_void) -> PaError {
    PA_NOT_AVAILABLE
}

pub unsafe fn Pa_ReadStream(_stream: *mut c_void, _buffer: *mut c_void, _frames: c_ulong) -> PaError {
    PA_NOT_AVAILABLE
}

pub unsafe fn Pa_WriteStream(_stream: *mut c_void, _buffer: *const c_void, _frames: c_ulong) -> PaError {
    PA_NOT_AVAILABLE
}
