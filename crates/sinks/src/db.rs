//! Database sink
//!
//! Drains decoded packets from its queue, batches them by count and time,
//! and hands batches to a [`PacketStore`]. The concrete driver (SQL
//! dialect, schema, connection handling) lives behind the trait; the sink
//! only owns batching, error accounting and the consume loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hepflow_protocol::HepPacket;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info};

use crate::util::RateLimitedLogger;
use crate::Result;

/// Storage backend for decoded packets
#[async_trait]
pub trait PacketStore: Send {
    /// Persist one batch
    async fn store(&mut self, packets: &[Arc<HepPacket>]) -> Result<()>;
}

/// Database sink configuration
#[derive(Debug, Clone)]
pub struct DbSinkConfig {
    /// Driver name, passed through to the store backend
    pub driver: String,

    /// Server address, passed through to the store backend
    pub addr: String,

    /// Packets per batch before an early flush
    pub batch_size: usize,

    /// Flush interval for partial batches
    pub flush_interval: Duration,
}

impl Default for DbSinkConfig {
    fn default() -> Self {
        Self {
            driver: "postgres".into(),
            addr: "localhost:5432".into(),
            batch_size: 200,
            flush_interval: Duration::from_millis(500),
        }
    }
}

/// Counters for the database sink
#[derive(Debug, Default)]
pub struct DbSinkMetrics {
    /// Batches handed to the store
    pub batches_written: AtomicU64,

    /// Packets handed to the store
    pub packets_written: AtomicU64,

    /// Batches the store rejected
    pub write_errors: AtomicU64,
}

/// Batching consumer over the db queue
pub struct DbSink {
    config: DbSinkConfig,
    receiver: mpsc::Receiver<Arc<HepPacket>>,
    store: Box<dyn PacketStore>,
    metrics: Arc<DbSinkMetrics>,
    logger: RateLimitedLogger,
}

impl DbSink {
    /// Create a sink over the given queue and store backend
    pub fn new(
        config: DbSinkConfig,
        receiver: mpsc::Receiver<Arc<HepPacket>>,
        store: Box<dyn PacketStore>,
    ) -> Self {
        Self {
            config,
            receiver,
            store,
            metrics: Arc::new(DbSinkMetrics::default()),
            logger: RateLimitedLogger::default(),
        }
    }

    /// Get a handle to the sink's counters
    pub fn metrics(&self) -> Arc<DbSinkMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run until the queue closes; flushes the final partial batch
    pub async fn run(mut self) {
        info!(
            driver = %self.config.driver,
            addr = %self.config.addr,
            batch_size = self.config.batch_size,
            "db sink starting"
        );

        let mut batch: Vec<Arc<HepPacket>> = Vec::with_capacity(self.config.batch_size);
        let mut ticker = interval(self.config.flush_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            tokio::select! {
                received = self.receiver.recv() => match received {
                    Some(packet) => {
                        batch.push(packet);
                        if batch.len() >= self.config.batch_size {
                            Self::flush(&mut self.store, &mut batch, &self.metrics, &self.logger)
                                .await;
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    Self::flush(&mut self.store, &mut batch, &self.metrics, &self.logger).await;
                }
            }
        }

        Self::flush(&mut self.store, &mut batch, &self.metrics, &self.logger).await;

        info!(
            batches = self.metrics.batches_written.load(Ordering::Relaxed),
            packets = self.metrics.packets_written.load(Ordering::Relaxed),
            errors = self.metrics.write_errors.load(Ordering::Relaxed),
            "db sink shutting down"
        );
    }

    async fn flush(
        store: &mut Box<dyn PacketStore>,
        batch: &mut Vec<Arc<HepPacket>>,
        metrics: &DbSinkMetrics,
        logger: &RateLimitedLogger,
    ) {
        if batch.is_empty() {
            return;
        }

        match store.store(batch).await {
            Ok(()) => {
                metrics.batches_written.fetch_add(1, Ordering::Relaxed);
                metrics
                    .packets_written
                    .fetch_add(batch.len() as u64, Ordering::Relaxed);
            }
            Err(e) => {
                metrics.write_errors.fetch_add(1, Ordering::Relaxed);
                logger.error("db store failed", &e);
            }
        }

        batch.clear();
    }
}

/// Store that logs batch sizes and discards the data
///
/// Stands in wherever no concrete driver is wired; keeps the pipeline
/// observable end to end.
#[derive(Debug, Default)]
pub struct LogStore;

#[async_trait]
impl PacketStore for LogStore {
    async fn store(&mut self, packets: &[Arc<HepPacket>]) -> Result<()> {
        debug!(packets = packets.len(), "discarding db batch");
        Ok(())
    }
}

/// In-memory store for tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    packets: Arc<Mutex<Vec<Arc<HepPacket>>>>,
}

impl MemoryStore {
    /// All packets stored so far
    pub fn stored(&self) -> Vec<Arc<HepPacket>> {
        self.packets.lock().clone()
    }
}

#[async_trait]
impl PacketStore for MemoryStore {
    async fn store(&mut self, packets: &[Arc<HepPacket>]) -> Result<()> {
        self.packets.lock().extend_from_slice(packets);
        Ok(())
    }
}

#[cfg(test)]
#[path = "db_test.rs"]
mod db_test;
