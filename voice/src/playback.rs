//! Playback consumer: a dedicated thread draining the sink into the device.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use skytalk_audio::OutputDevice;
use tracing::{debug, warn};

use crate::sink::{AudioSink, PlaybackItem, TryEnqueue};

/// Plays enqueued PCM in order on its own thread.
pub struct PlaybackConsumer {
    sink: Arc<AudioSink>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackConsumer {
    /// Takes ownership of `device` and starts the playback thread.
    pub fn start(
        device: Box<dyn OutputDevice>,
        capacity: usize,
        frame_bytes: usize,
    ) -> io::Result<Self> {
        let sink = Arc::new(AudioSink::new(device, capacity, frame_bytes));
        let worker = {
            let sink = sink.clone();
            thread::Builder::new()
                .name("audio-playback".into())
                .spawn(move || {
                    while let Some((generation, item)) = sink.next() {
                        sink.play(generation, &item);
                    }
                    debug!("playback thread exiting");
                })?
        };
        Ok(Self {
            sink,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Queues decoded PCM without blocking. Empty PCM counts as queued.
    pub fn try_enqueue(&self, pcm: Vec<u8>) -> TryEnqueue {
        if pcm.is_empty() {
            return TryEnqueue::Queued;
        }
        self.sink.try_enqueue(PlaybackItem::from(pcm))
    }

    /// Waits until a full queue may accept audio again.
    pub async fn space_available(&self) {
        self.sink.space_available().await
    }

    /// Drops everything queued and resets the device (barge-in).
    pub fn interrupt(&self) -> io::Result<()> {
        self.sink.flush()
    }

    pub fn queued_len(&self) -> usize {
        self.sink.queued_len()
    }

    /// Stops the thread and releases the device. Safe to call more than once.
    pub fn stop(&self) {
        let Some(worker) = self.worker.lock().take() else {
            return;
        };
        self.sink.close();
        if worker.join().is_err() {
            warn!("playback thread panicked");
        }
        if let Err(e) = self.sink.release() {
            warn!(error = %e, "failed to close output device");
        }
    }
}

impl Drop for PlaybackConsumer {
    fn drop(&mut self) {
        self.stop();
    }
}
