//! Message-queue sink
//!
//! Publishes the raw HEP frames exactly as they arrived on the wire, so
//! downstream consumers can re-decode them. The concrete queue client
//! lives behind the [`Publisher`] trait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::util::RateLimitedLogger;
use crate::Result;

/// Publishing backend for raw HEP frames
#[async_trait]
pub trait Publisher: Send {
    /// Publish one frame under the given topic
    async fn publish(&mut self, topic: &str, frame: Bytes) -> Result<()>;
}

/// Message queue sink configuration
#[derive(Debug, Clone)]
pub struct MqSinkConfig {
    /// Queue system name, passed through to the publisher backend
    pub name: String,

    /// Server address, passed through to the publisher backend
    pub addr: String,

    /// Topic the frames are published under
    pub topic: String,
}

impl Default for MqSinkConfig {
    fn default() -> Self {
        Self {
            name: "nsq".into(),
            addr: "localhost:4150".into(),
            topic: "hep".into(),
        }
    }
}

/// Counters for the message-queue sink
#[derive(Debug, Default)]
pub struct MqSinkMetrics {
    /// Frames published
    pub frames_published: AtomicU64,

    /// Bytes published
    pub bytes_published: AtomicU64,

    /// Frames the publisher rejected
    pub publish_errors: AtomicU64,
}

/// Consumer over the mq queue
pub struct MqSink {
    config: MqSinkConfig,
    receiver: mpsc::Receiver<Bytes>,
    publisher: Box<dyn Publisher>,
    metrics: Arc<MqSinkMetrics>,
    logger: RateLimitedLogger,
}

impl MqSink {
    /// Create a sink over the given queue and publisher backend
    pub fn new(
        config: MqSinkConfig,
        receiver: mpsc::Receiver<Bytes>,
        publisher: Box<dyn Publisher>,
    ) -> Self {
        Self {
            config,
            receiver,
            publisher,
            metrics: Arc::new(MqSinkMetrics::default()),
            logger: RateLimitedLogger::default(),
        }
    }

    /// Get a handle to the sink's counters
    pub fn metrics(&self) -> Arc<MqSinkMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run until the queue closes
    pub async fn run(mut self) {
        info!(
            name = %self.config.name,
            addr = %self.config.addr,
            topic = %self.config.topic,
            "mq sink starting"
        );

        while let Some(frame) = self.receiver.recv().await {
            let len = frame.len() as u64;
            match self.publisher.publish(&self.config.topic, frame).await {
                Ok(()) => {
                    self.metrics.frames_published.fetch_add(1, Ordering::Relaxed);
                    self.metrics.bytes_published.fetch_add(len, Ordering::Relaxed);
                }
                Err(e) => {
                    self.metrics.publish_errors.fetch_add(1, Ordering::Relaxed);
                    self.logger.error("mq publish failed", &e);
                }
            }
        }

        info!(
            frames = self.metrics.frames_published.load(Ordering::Relaxed),
            errors = self.metrics.publish_errors.load(Ordering::Relaxed),
            "mq sink shutting down"
        );
    }
}

/// Publisher that logs frame sizes and discards the data
#[derive(Debug, Default)]
pub struct LogPublisher;

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&mut self, topic: &str, frame: Bytes) -> Result<()> {
        debug!(topic = %topic, bytes = frame.len(), "discarding mq frame");
        Ok(())
    }
}

/// In-memory publisher for tests
#[derive(Debug, Default, Clone)]
pub struct MemoryPublisher {
    frames: Arc<Mutex<Vec<(String, Bytes)>>>,
}

impl MemoryPublisher {
    /// All frames published so far
    pub fn published(&self) -> Vec<(String, Bytes)> {
        self.frames.lock().clone()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&mut self, topic: &str, frame: Bytes) -> Result<()> {
        self.frames.lock().push((topic.to_owned(), frame));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_frames_published_with_topic() {
        let (tx, rx) = mpsc::channel(16);
        let publisher = MemoryPublisher::default();
        let sink = MqSink::new(MqSinkConfig::default(), rx, Box::new(publisher.clone()));
        let metrics = sink.metrics();
        let handle = tokio::spawn(sink.run());

        tx.send(Bytes::from_static(b"HEP3\x00\x06")).await.unwrap();
        drop(tx);

        timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "hep");
        // Wire format is preserved byte for byte
        assert_eq!(&published[0].1[..], b"HEP3\x00\x06");
        assert_eq!(metrics.bytes_published.load(Ordering::Relaxed), 6);
    }

    struct FailingPublisher;

    #[async_trait]
    impl Publisher for FailingPublisher {
        async fn publish(&mut self, _topic: &str, _frame: Bytes) -> Result<()> {
            Err(crate::SinkError::backend("broker down"))
        }
    }

    #[tokio::test]
    async fn test_publish_errors_counted_not_fatal() {
        let (tx, rx) = mpsc::channel(16);
        let sink = MqSink::new(MqSinkConfig::default(), rx, Box::new(FailingPublisher));
        let metrics = sink.metrics();
        let handle = tokio::spawn(sink.run());

        for _ in 0..5 {
            tx.send(Bytes::from_static(b"frame")).await.unwrap();
        }
        drop(tx);

        timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
        assert_eq!(metrics.publish_errors.load(Ordering::Relaxed), 5);
        assert_eq!(metrics.frames_published.load(Ordering::Relaxed), 0);
    }
}
