//! Sink dispatcher - non-blocking fan-out to the sink queues
//!
//! Each enabled sink owns one bounded queue. Dispatch is a non-blocking
//! offer: a full queue drops the message for that sink only, counts the
//! drop, and logs once per [`OVERFLOW_LOG_EVERY`] drops. This is what
//! isolates sinks from one another - a stalled database consumer sheds its
//! own queue while the metrics and message-queue sinks keep receiving.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use hepflow_protocol::HepPacket;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::server::SinkSet;

/// Drops per sink between overflow warnings
pub const OVERFLOW_LOG_EVERY: u64 = 128;

/// Handle to one sink queue
///
/// Wraps the sender half of the sink's bounded channel together with its
/// overflow accounting.
pub struct SinkHandle<T> {
    /// Sink name for logging
    name: &'static str,

    /// Channel sender for the sink consumer
    sender: mpsc::Sender<T>,

    /// Messages dropped because the queue was full
    overflow: AtomicU64,
}

impl<T> SinkHandle<T> {
    /// Create a handle over a sink queue sender
    pub fn new(name: &'static str, sender: mpsc::Sender<T>) -> Self {
        Self {
            name,
            sender,
            overflow: AtomicU64::new(0),
        }
    }

    /// Offer a message without blocking
    ///
    /// Returns `true` when the message was enqueued. A full queue counts
    /// the drop and emits a sampled warning; a closed queue is logged at
    /// debug level (the consumer is gone, which shutdown makes normal).
    pub fn offer(&self, item: T) -> bool {
        match self.sender.try_send(item) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.overflow.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped % OVERFLOW_LOG_EVERY == 0 {
                    warn!(
                        sink = self.name,
                        dropped = OVERFLOW_LOG_EVERY,
                        total_dropped = dropped,
                        "sink queue overflowing"
                    );
                }
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(sink = self.name, "sink queue closed, dropping");
                false
            }
        }
    }

    /// Get the sink's name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total messages dropped on this sink
    #[inline]
    pub fn overflow_count(&self) -> u64 {
        self.overflow.load(Ordering::Relaxed)
    }

    /// Current queue depth
    #[inline]
    pub fn depth(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }
}

/// Receiver halves of the sink queues, handed to the sink consumers
///
/// A `None` entry means the sink is disabled and no queue exists for it.
pub struct SinkQueues {
    /// Decoded packets for the database writer
    pub db: Option<mpsc::Receiver<Arc<HepPacket>>>,

    /// Raw HEP frames for the message-queue publisher
    pub mq: Option<mpsc::Receiver<Bytes>>,

    /// Decoded packets for the metrics exporter
    pub metrics: Option<mpsc::Receiver<Arc<HepPacket>>>,
}

/// Current depth of the three sink queues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueDepths {
    pub db: usize,
    pub mq: usize,
    pub metrics: usize,
}

/// Non-blocking fan-out over the enabled sink queues
///
/// The database and metrics sinks share the decoded packet by handle; the
/// message-queue sink receives its own copy of the wire bytes, taken
/// before the receive buffer is recycled.
pub struct Dispatcher {
    db: Option<SinkHandle<Arc<HepPacket>>>,
    mq: Option<SinkHandle<Bytes>>,
    metrics: Option<SinkHandle<Arc<HepPacket>>>,
}

impl Dispatcher {
    /// Create queues for the enabled sinks
    ///
    /// Returns the dispatcher (sender side) and the receiver halves for
    /// the sink consumers.
    pub fn new(sinks: SinkSet, queue_size: usize) -> (Self, SinkQueues) {
        let (db_handle, db_rx) = if sinks.db {
            let (tx, rx) = mpsc::channel(queue_size);
            (Some(SinkHandle::new("db", tx)), Some(rx))
        } else {
            (None, None)
        };

        let (mq_handle, mq_rx) = if sinks.mq {
            let (tx, rx) = mpsc::channel(queue_size);
            (Some(SinkHandle::new("mq", tx)), Some(rx))
        } else {
            (None, None)
        };

        let (metrics_handle, metrics_rx) = if sinks.metrics {
            let (tx, rx) = mpsc::channel(queue_size);
            (Some(SinkHandle::new("metrics", tx)), Some(rx))
        } else {
            (None, None)
        };

        (
            Self {
                db: db_handle,
                mq: mq_handle,
                metrics: metrics_handle,
            },
            SinkQueues {
                db: db_rx,
                mq: mq_rx,
                metrics: metrics_rx,
            },
        )
    }

    /// Fan one decoded packet out to the enabled sinks
    ///
    /// `wire` is the raw frame the packet was decoded from; the queue sink
    /// gets its own copy so the caller is free to recycle the buffer as
    /// soon as this returns.
    pub fn dispatch(&self, packet: &Arc<HepPacket>, wire: &[u8]) {
        if let Some(db) = &self.db {
            db.offer(Arc::clone(packet));
        }
        if let Some(metrics) = &self.metrics {
            metrics.offer(Arc::clone(packet));
        }
        if let Some(mq) = &self.mq {
            mq.offer(Bytes::copy_from_slice(wire));
        }
    }

    /// Total drops on the database sink
    pub fn db_overflow(&self) -> u64 {
        self.db.as_ref().map_or(0, SinkHandle::overflow_count)
    }

    /// Total drops on the message-queue sink
    pub fn mq_overflow(&self) -> u64 {
        self.mq.as_ref().map_or(0, SinkHandle::overflow_count)
    }

    /// Total drops on the metrics sink
    pub fn metrics_overflow(&self) -> u64 {
        self.metrics.as_ref().map_or(0, SinkHandle::overflow_count)
    }

    /// Current depth of the three sink queues (zero when disabled)
    pub fn queue_depths(&self) -> QueueDepths {
        QueueDepths {
            db: self.db.as_ref().map_or(0, SinkHandle::depth),
            mq: self.mq.as_ref().map_or(0, SinkHandle::depth),
            metrics: self.metrics.as_ref().map_or(0, SinkHandle::depth),
        }
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;
