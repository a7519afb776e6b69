//! The output device and its bounded playback queue.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};
use skytalk_audio::OutputDevice;
use tokio::sync::Notify;
use tracing::{debug, error};

/// Decoded PCM of one chunk of synthesized speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackItem {
    pub pcm: Vec<u8>,
}

impl From<Vec<u8>> for PlaybackItem {
    fn from(pcm: Vec<u8>) -> Self {
        Self { pcm }
    }
}

/// Outcome of [`AudioSink::try_enqueue`].
#[derive(Debug, PartialEq, Eq)]
pub enum TryEnqueue {
    Queued,
    /// The queue is full; the item is handed back.
    Full(PlaybackItem),
    /// The sink is closed or the device failed; the item was dropped.
    Dropped,
}

struct QueueState {
    items: VecDeque<PlaybackItem>,
    closed: bool,
    failed: bool,
}

/// Owns the output device; every write and reset goes through here.
///
/// Lock order is device, then queue. Writers hold the device lock for one
/// frame-sized slice at a time and re-check `playing` and the flush
/// generation before each slice, so a flush waits for at most one slice.
///
/// Async producers use [`AudioSink::try_enqueue`] together with
/// [`AudioSink::space_available`] instead of the blocking
/// [`AudioSink::enqueue`].
pub struct AudioSink {
    queue: Mutex<QueueState>,
    available: Condvar,
    space: Condvar,
    space_ready: Notify,
    device: Mutex<Box<dyn OutputDevice>>,
    playing: AtomicBool,
    generation: AtomicU64,
    capacity: usize,
    frame_bytes: usize,
}

impl AudioSink {
    /// Wraps `device`. `capacity` bounds the queue; writes are split into
    /// `frame_bytes` slices.
    pub fn new(device: Box<dyn OutputDevice>, capacity: usize, frame_bytes: usize) -> Self {
        Self {
            queue: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity.max(1)),
                closed: false,
                failed: false,
            }),
            available: Condvar::new(),
            space: Condvar::new(),
            space_ready: Notify::new(),
            device: Mutex::new(device),
            playing: AtomicBool::new(true),
            generation: AtomicU64::new(0),
            capacity: capacity.max(1),
            frame_bytes: frame_bytes.max(2),
        }
    }

    /// Appends an item, blocking only while the queue is full.
    ///
    /// Returns false if the item was dropped because the sink is closed or
    /// the device failed.
    pub fn enqueue(&self, item: PlaybackItem) -> bool {
        let mut q = self.queue.lock();
        while q.items.len() >= self.capacity && !q.closed && !q.failed {
            self.space.wait(&mut q);
        }
        if q.closed || q.failed {
            return false;
        }
        q.items.push_back(item);
        self.available.notify_one();
        true
    }

    /// Appends an item without waiting.
    pub fn try_enqueue(&self, item: PlaybackItem) -> TryEnqueue {
        let mut q = self.queue.lock();
        if q.closed || q.failed {
            return TryEnqueue::Dropped;
        }
        if q.items.len() >= self.capacity {
            return TryEnqueue::Full(item);
        }
        q.items.push_back(item);
        self.available.notify_one();
        TryEnqueue::Queued
    }

    /// Resolves once the queue may have room again, or the sink stopped
    /// accepting items. Wakeups that happen while nobody waits are kept,
    /// so a slot freed between a full `try_enqueue` and this call is not
    /// missed.
    pub async fn space_available(&self) {
        self.space_ready.notified().await
    }

    /// Blocks until an item is available. Returns None once closed.
    ///
    /// The generation returned must be passed to [`AudioSink::play`].
    pub fn next(&self) -> Option<(u64, PlaybackItem)> {
        let mut q = self.queue.lock();
        loop {
            if q.closed || q.failed {
                return None;
            }
            if let Some(item) = q.items.pop_front() {
                self.space.notify_one();
                self.space_ready.notify_one();
                return Some((self.generation.load(Ordering::Acquire), item));
            }
            self.available.wait(&mut q);
        }
    }

    /// Writes an item taken at `generation`, stopping early if a flush
    /// happened since.
    pub fn play(&self, generation: u64, item: &PlaybackItem) {
        for slice in item.pcm.chunks(self.frame_bytes) {
            if !self.playing.load(Ordering::Acquire) {
                return;
            }
            let mut device = self.device.lock();
            if !self.playing.load(Ordering::Acquire)
                || self.generation.load(Ordering::Acquire) != generation
            {
                return;
            }
            if let Err(e) = device.write(slice) {
                drop(device);
                self.fail(e);
                return;
            }
        }
    }

    /// Discards all queued audio and resets the device.
    ///
    /// Items enqueued after this returns play normally.
    pub fn flush(&self) -> io::Result<()> {
        self.playing.store(false, Ordering::Release);
        let mut device = self.device.lock();
        let dropped = {
            let mut q = self.queue.lock();
            let n = q.items.len();
            q.items.clear();
            self.generation.fetch_add(1, Ordering::AcqRel);
            n
        };
        self.space.notify_all();
        self.space_ready.notify_one();

        let result = device.stop().and_then(|_| device.start());
        drop(device);
        self.playing.store(true, Ordering::Release);

        debug!(dropped, "playback flushed");
        if let Err(ref e) = result {
            self.fail(io::Error::new(e.kind(), e.to_string()));
        }
        result
    }

    /// Stops accepting and handing out items. Queued items are discarded.
    pub fn close(&self) {
        let mut q = self.queue.lock();
        q.closed = true;
        q.items.clear();
        self.available.notify_all();
        self.space.notify_all();
        self.space_ready.notify_one();
    }

    /// Closes the underlying device.
    pub fn release(&self) -> io::Result<()> {
        self.device.lock().close()
    }

    /// Number of items waiting to be played.
    pub fn queued_len(&self) -> usize {
        self.queue.lock().items.len()
    }

    /// True once a device write or reset failed.
    pub fn is_failed(&self) -> bool {
        self.queue.lock().failed
    }

    fn fail(&self, e: io::Error) {
        error!(error = %e, "output device failed; dropping further audio");
        let mut q = self.queue.lock();
        q.failed = true;
        q.items.clear();
        self.available.notify_all();
        self.space.notify_all();
        self.space_ready.notify_one();
    }
}
