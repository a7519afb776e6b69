//! Device traits consumed by the voice pipeline.
//!
//! Both traits use blocking I/O. An implementation owns its device
//! exclusively; callers serialize access themselves.

use std::io;
use std::sync::Arc;

/// Input device producing fixed-size PCM frames.
pub trait AudioSource: Send {
    /// Blocks until one frame is available and returns its raw PCM bytes.
    ///
    /// An error means the device is gone; callers treat it as fatal to the
    /// capture path.
    fn read_frame(&mut self) -> io::Result<Vec<u8>>;

    /// Releases the device. Further reads fail.
    fn close(&mut self) -> io::Result<()>;

    /// Returns a handle that makes a blocked [`AudioSource::read_frame`]
    /// return early, or None if reads cannot be interrupted.
    fn abort_handle(&self) -> Option<Arc<dyn ReadAbort>> {
        None
    }
}

/// Unblocks a pending read from a thread other than the reader. After an
/// abort, reads fail until the device is closed.
pub trait ReadAbort: Send + Sync {
    fn abort(&self);
}

/// Output device accepting raw PCM bytes.
pub trait OutputDevice: Send {
    /// Writes PCM bytes, blocking until the device accepted them.
    fn write(&mut self, pcm: &[u8]) -> io::Result<()>;

    /// Stops the device, discarding anything buffered inside it.
    fn stop(&mut self) -> io::Result<()>;

    /// Starts (or restarts) the device.
    fn start(&mut self) -> io::Result<()>;

    /// Releases the device. Further writes fail.
    fn close(&mut self) -> io::Result<()>;
}

impl<T: AudioSource + ?Sized> AudioSource for Box<T> {
    fn read_frame(&mut self) -> io::Result<Vec<u8>> {
        (**self).read_frame()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }

    fn abort_handle(&self) -> Option<Arc<dyn ReadAbort>> {
        (**self).abort_handle()
    }
}

impl<T: OutputDevice + ?Sized> OutputDevice for Box<T> {
    fn write(&mut self, pcm: &[u8]) -> io::Result<()> {
        (**self).write(pcm)
    }

    fn stop(&mut self) -> io::Result<()> {
        (**self).stop()
    }

    fn start(&mut self) -> io::Result<()> {
        (**self).start()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
