//! Capture transmitter: reads microphone frames on a dedicated thread and
//! hands them to the controller as base64 append messages.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::Mutex;
use skytalk_audio::{AudioSource, ReadAbort};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::event::OutboundMessage;

/// How long [`CaptureTransmitter::stop`] waits for a pending read.
pub const STOP_GRACE: Duration = Duration::from_millis(250);

/// Streams microphone frames to an outbound hook.
pub struct CaptureTransmitter {
    running: Arc<AtomicBool>,
    source: Mutex<Option<Box<dyn AudioSource>>>,
    abort: Option<Arc<dyn ReadAbort>>,
    /// Hands the source back when the capture thread exits.
    done: Mutex<Option<std_mpsc::Receiver<Box<dyn AudioSource>>>>,
    started: AtomicBool,
    stopped: AtomicBool,
    hook: UnboundedSender<OutboundMessage>,
}

impl CaptureTransmitter {
    pub fn new(source: Box<dyn AudioSource>, hook: UnboundedSender<OutboundMessage>) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            abort: source.abort_handle(),
            source: Mutex::new(Some(source)),
            done: Mutex::new(None),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            hook,
        }
    }

    /// Starts the capture thread. Later calls are no-ops.
    pub fn start(&self) -> std::io::Result<()> {
        let Some(mut source) = self.source.lock().take() else {
            return Ok(());
        };
        self.running.store(true, Ordering::Release);
        let running = self.running.clone();
        let hook = self.hook.clone();
        let (done_tx, done_rx) = std_mpsc::channel();

        let spawned = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || {
                while running.load(Ordering::Acquire) {
                    let frame = match source.read_frame() {
                        Ok(frame) => frame,
                        Err(e) if running.load(Ordering::Acquire) => {
                            warn!(error = %e, "microphone read failed; capture stopped");
                            break;
                        }
                        Err(e) => {
                            debug!(error = %e, "read aborted");
                            break;
                        }
                    };
                    if !running.load(Ordering::Acquire) {
                        break;
                    }
                    if hook
                        .send(OutboundMessage::AppendAudio(BASE64.encode(&frame)))
                        .is_err()
                    {
                        break;
                    }
                }
                running.store(false, Ordering::Release);
                debug!("capture thread exiting");
                // stop() stopped waiting; the device is released here.
                if let Err(std_mpsc::SendError(mut source)) = done_tx.send(source) {
                    if let Err(e) = source.close() {
                        warn!(error = %e, "failed to close input device");
                    }
                }
            });

        match spawned {
            Ok(_) => {
                *self.done.lock() = Some(done_rx);
                self.started.store(true, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    /// True while the capture thread is reading frames.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops capturing, queues a final commit, and releases the microphone.
    ///
    /// A read in progress is aborted through the source's abort handle.
    /// If it still has not returned after [`STOP_GRACE`], the thread is left
    /// to close the device itself once the read comes back, and this
    /// returns anyway.
    ///
    /// The commit is only sent if capture was started. Safe to call more
    /// than once; only the first call has an effect.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.running.store(false, Ordering::Release);

        let done = self.done.lock().take();
        let mut source = match done {
            Some(done) => {
                if let Some(abort) = &self.abort {
                    abort.abort();
                }
                match done.recv_timeout(STOP_GRACE) {
                    Ok(source) => Some(source),
                    Err(RecvTimeoutError::Timeout) => {
                        warn!(
                            grace = ?STOP_GRACE,
                            "microphone read did not return; detaching capture thread"
                        );
                        None
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        warn!("capture thread panicked");
                        None
                    }
                }
            }
            None => self.source.lock().take(),
        };

        if self.started.load(Ordering::Acquire) {
            let _ = self.hook.send(OutboundMessage::CommitBuffer);
        }
        if let Some(source) = source.as_mut() {
            if let Err(e) = source.close() {
                warn!(error = %e, "failed to close input device");
            }
        }
    }
}

impl Drop for CaptureTransmitter {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct Mic {
        frames: usize,
        closed: Arc<AtomicBool>,
    }

    impl AudioSource for Mic {
        fn read_frame(&mut self) -> io::Result<Vec<u8>> {
            if self.frames == 0 {
                thread::sleep(Duration::from_millis(5));
                return Ok(vec![0; 4]);
            }
            self.frames -= 1;
            Ok(vec![1, 2, 3])
        }

        fn close(&mut self) -> io::Result<()> {
            self.closed.store(true, Ordering::Release);
            Ok(())
        }
    }

    #[test]
    fn test_capture_then_commit() {
        let closed = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let capture = CaptureTransmitter::new(
            Box::new(Mic {
                frames: 2,
                closed: closed.clone(),
            }),
            tx,
        );
        capture.start().unwrap();

        let first = rx.blocking_recv().unwrap();
        assert_eq!(first, OutboundMessage::AppendAudio("AQID".into()));

        capture.stop();
        capture.stop();
        assert!(closed.load(Ordering::Acquire));
        assert!(!capture.is_running());

        let mut rest = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            rest.push(msg);
        }
        let commits = rest
            .iter()
            .filter(|m| **m == OutboundMessage::CommitBuffer)
            .count();
        assert_eq!(commits, 1);
        assert_eq!(rest.last(), Some(&OutboundMessage::CommitBuffer));
    }

    #[test]
    fn test_stop_without_start() {
        let closed = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let capture = CaptureTransmitter::new(
            Box::new(Mic {
                frames: 0,
                closed: closed.clone(),
            }),
            tx,
        );
        capture.stop();
        assert!(closed.load(Ordering::Acquire));
        assert!(rx.try_recv().is_err());
    }

    /// Blocks every read after the first until `gate` fires.
    struct StuckMic {
        gate: std_mpsc::Receiver<()>,
        reads: usize,
        closed: Arc<AtomicBool>,
        abort: Option<Arc<dyn ReadAbort>>,
    }

    impl AudioSource for StuckMic {
        fn read_frame(&mut self) -> io::Result<Vec<u8>> {
            self.reads += 1;
            if self.reads > 1 {
                let _ = self.gate.recv();
            }
            Ok(vec![1, 2, 3])
        }

        fn close(&mut self) -> io::Result<()> {
            self.closed.store(true, Ordering::Release);
            Ok(())
        }

        fn abort_handle(&self) -> Option<Arc<dyn ReadAbort>> {
            self.abort.clone()
        }
    }

    struct Unblock(std_mpsc::Sender<()>);

    impl ReadAbort for Unblock {
        fn abort(&self) {
            let _ = self.0.send(());
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundMessage>) -> Vec<OutboundMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn test_stop_with_stuck_read() {
        let closed = Arc::new(AtomicBool::new(false));
        let (release, gate) = std_mpsc::channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let capture = CaptureTransmitter::new(
            Box::new(StuckMic {
                gate,
                reads: 0,
                closed: closed.clone(),
                abort: None,
            }),
            tx,
        );
        capture.start().unwrap();
        assert_eq!(
            rx.blocking_recv().unwrap(),
            OutboundMessage::AppendAudio("AQID".into())
        );

        let begin = std::time::Instant::now();
        capture.stop();
        assert!(begin.elapsed() < Duration::from_secs(1));
        assert_eq!(drain(&mut rx), vec![OutboundMessage::CommitBuffer]);

        // The detached thread releases the device once the read returns,
        // without sending the late frame.
        release.send(()).unwrap();
        for _ in 0..100 {
            if closed.load(Ordering::Acquire) {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(closed.load(Ordering::Acquire));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_stop_aborts_pending_read() {
        let closed = Arc::new(AtomicBool::new(false));
        let (release, gate) = std_mpsc::channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let capture = CaptureTransmitter::new(
            Box::new(StuckMic {
                gate,
                reads: 0,
                closed: closed.clone(),
                abort: Some(Arc::new(Unblock(release))),
            }),
            tx,
        );
        capture.start().unwrap();
        rx.blocking_recv().unwrap();

        capture.stop();
        // Aborted reads return at once, so stop closes the device itself.
        assert!(closed.load(Ordering::Acquire));
        assert_eq!(drain(&mut rx), vec![OutboundMessage::CommitBuffer]);
    }

    #[test]
    fn test_read_error_stops_capture() {
        struct Broken;
        impl AudioSource for Broken {
            fn read_frame(&mut self) -> io::Result<Vec<u8>> {
                Err(io::Error::other("unplugged"))
            }
            fn close(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let (tx, _rx) = mpsc::unbounded_channel();
        let capture = CaptureTransmitter::new(Box::new(Broken), tx);
        capture.start().unwrap();
        for _ in 0..100 {
            if !capture.is_running() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!capture.is_running());
        capture.stop();
    }
}
