//! Bounded line queues between background readers and the event loop.
//!
//! Every output source (interpreter stdout/stderr, the OSC listener) owns
//! one queue of capacity [`QUEUE_CAPACITY`]. Producers live on background
//! threads; the single consumer is the event loop, which holds the
//! [`Subscription`] end. The channel is the only state shared across
//! threads.
//!
//! Two producer policies exist:
//! - [`LineSender::push`] blocks while the queue is full (interpreter
//!   output must never be lost).
//! - [`LineSender::offer`] drops the incoming line when the queue is full,
//!   counts it and logs a warning (real-time network events).
//!
//! [`LineSender::post`] is for the loop thread itself, which cannot wait on
//! a queue only it drains. Lines that do not fit are parked in an overflow
//! list that the subscription hands out before the channel.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::warn;

pub const QUEUE_CAPACITY: usize = 100;

/// A drop warning is logged for the first drop and then once per this many.
pub const DROP_REPORT_EVERY: usize = 100;

type Overflow = Arc<Mutex<VecDeque<String>>>;

/// Result of a non-blocking [`LineSender::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Queued,
    Dropped,
    Closed,
}

/// Producer end of a line queue. Cheap to clone (one per reader thread).
#[derive(Debug, Clone)]
pub struct LineSender {
    source: Arc<str>,
    tx: Sender<String>,
    overflow: Overflow,
    dropped: Arc<AtomicUsize>,
}

/// Consumer end of a line queue, owned by the event loop.
#[derive(Debug)]
pub struct Subscription {
    source: Arc<str>,
    rx: Receiver<String>,
    overflow: Overflow,
    dropped: Arc<AtomicUsize>,
}

/// Create a bounded queue for the named source.
pub fn line_queue(source: &str, capacity: usize) -> (LineSender, Subscription) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    let source: Arc<str> = Arc::from(source);
    let dropped = Arc::new(AtomicUsize::new(0));
    let overflow = Overflow::default();
    (
        LineSender {
            source: Arc::clone(&source),
            tx,
            overflow: Arc::clone(&overflow),
            dropped: Arc::clone(&dropped),
        },
        Subscription {
            source,
            rx,
            overflow,
            dropped,
        },
    )
}

fn lock(overflow: &Overflow) -> MutexGuard<'_, VecDeque<String>> {
    overflow.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// True for the drop totals worth a log line.
pub fn should_report_drop(total: usize) -> bool {
    total == 1 || total % DROP_REPORT_EVERY == 0
}

impl LineSender {
    /// Enqueue a line, waiting for room. Returns false once the consumer is gone.
    pub fn push(&self, line: String) -> bool {
        self.tx.send(line).is_ok()
    }

    /// Enqueue without waiting; a full queue drops the new line.
    pub fn offer(&self, line: String) -> Offer {
        match self.tx.try_send(line) {
            Ok(()) => Offer::Queued,
            Err(TrySendError::Full(line)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if should_report_drop(total) {
                    warn!(
                        source = %self.source,
                        dropped_total = total,
                        "queue full, dropped message: {line}"
                    );
                }
                Offer::Dropped
            }
            Err(TrySendError::Disconnected(_)) => Offer::Closed,
        }
    }

    /// Enqueue without waiting and without loss. A full channel parks the
    /// line in the overflow list. Returns false once the consumer is gone.
    pub fn post(&self, line: String) -> bool {
        let mut overflow = lock(&self.overflow);
        if !overflow.is_empty() {
            overflow.push_back(line);
            return true;
        }
        match self.tx.try_send(line) {
            Ok(()) => true,
            Err(TrySendError::Full(line)) => {
                overflow.push_back(line);
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl Subscription {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Next pending line, if any. Never blocks. Overflowed lines come first.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> Option<String> {
        if let Some(line) = lock(&self.overflow).pop_front() {
            return Some(line);
        }
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next line.
    pub fn next_timeout(&self, timeout: Duration) -> Option<String> {
        if let Some(line) = lock(&self.overflow).pop_front() {
            return Some(line);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(line) => Some(line),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len() + lock(&self.overflow).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines dropped by [`LineSender::offer`] so far.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}
