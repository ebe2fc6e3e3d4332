//! Lock-free pool of receive buffers
//!
//! The receiver fills one buffer per datagram; the buffer travels through
//! the inbound queue to a worker, which returns it here once the packet is
//! decoded and the raw bytes have been copied out for the queue sink.
//! Pooling keeps the hot path free of per-datagram allocations.

use bytes::BytesMut;
use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free pool of fixed-length `BytesMut` receive buffers
///
/// Pre-allocates buffers at construction time. When the pool runs dry a
/// fresh buffer is allocated on demand and may be pooled on release.
pub struct BufferPool {
    /// Free buffers waiting for the next datagram
    queue: ArrayQueue<BytesMut>,

    /// Length every acquired buffer is restored to
    buffer_len: usize,

    /// Pool accounting
    metrics: BufferPoolMetrics,
}

/// Counters for pool monitoring
#[derive(Debug, Default)]
pub struct BufferPoolMetrics {
    /// Acquisitions served from the pool
    pub hits: AtomicU64,

    /// Acquisitions that had to allocate
    pub misses: AtomicU64,

    /// Buffers returned to the pool
    pub returns: AtomicU64,

    /// Buffers dropped on release (pool full or buffer shrank)
    pub drops: AtomicU64,
}

impl BufferPool {
    /// Create a pool of `pool_size` buffers, each `buffer_len` bytes long
    pub fn new(pool_size: usize, buffer_len: usize) -> Self {
        let queue = ArrayQueue::new(pool_size);

        for _ in 0..pool_size {
            // Filling an empty queue cannot fail
            let _ = queue.push(BytesMut::with_capacity(buffer_len));
        }

        Self {
            queue,
            buffer_len,
            metrics: BufferPoolMetrics::default(),
        }
    }

    /// Take a buffer, restored to full length
    ///
    /// The contents are unspecified; the caller overwrites them with the
    /// next datagram.
    pub fn acquire(&self) -> BytesMut {
        let mut buf = match self.queue.pop() {
            Some(buf) => {
                self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                self.metrics.misses.fetch_add(1, Ordering::Relaxed);
                BytesMut::with_capacity(self.buffer_len)
            }
        };
        buf.resize(self.buffer_len, 0);
        buf
    }

    /// Hand a buffer back for reuse
    ///
    /// Accepts sliced views; length is restored on the next acquire. A
    /// buffer whose capacity no longer covers the full length (it was split
    /// or frozen along the way) is dropped instead of pooled.
    pub fn release(&self, mut buf: BytesMut) {
        buf.clear();

        if buf.capacity() >= self.buffer_len {
            match self.queue.push(buf) {
                Ok(()) => {
                    self.metrics.returns.fetch_add(1, Ordering::Relaxed);
                }
                Err(_) => {
                    self.metrics.drops.fetch_add(1, Ordering::Relaxed);
                }
            }
        } else {
            self.metrics.drops.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of buffers currently available
    #[inline]
    pub fn available(&self) -> usize {
        self.queue.len()
    }

    /// Maximum number of pooled buffers
    #[inline]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Length of each acquired buffer
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    /// Pool accounting counters
    #[inline]
    pub fn metrics(&self) -> &BufferPoolMetrics {
        &self.metrics
    }
}

#[cfg(test)]
#[path = "buffer_pool_test.rs"]
mod buffer_pool_test;
