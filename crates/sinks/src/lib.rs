//! Sink consumers for the HEP ingest pipeline
//!
//! Each sink is a long-lived task that drains one bounded queue filled by
//! the ingest dispatcher:
//!
//! - [`DbSink`] batches decoded packets into a pluggable [`PacketStore`]
//! - [`MqSink`] publishes raw HEP frames through a pluggable [`Publisher`],
//!   preserving wire format for downstream re-decoding
//! - [`MetricsSink`] aggregates counters from decoded packets and serves a
//!   scrape endpoint
//!
//! No sink ever calls back into the pipeline; a stalled sink only ever
//! fills its own queue.

pub mod db;
mod error;
pub mod metrics;
pub mod mq;
pub mod util;

pub use db::{DbSink, DbSinkConfig, LogStore, MemoryStore, PacketStore};
pub use error::SinkError;
pub use metrics::{serve_scrape, MetricsRegistry, MetricsSink};
pub use mq::{LogPublisher, MemoryPublisher, MqSink, MqSinkConfig, Publisher};
pub use util::RateLimitedLogger;

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;
