//! Sink configuration types
//!
//! A sink consumer is started when its section is present; the section's
//! fields select the external backend. The ingest core never interprets
//! `driver` or `name` itself - they are passed through to the store or
//! publisher implementation.

use serde::Deserialize;

/// Container for all sink configurations
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SinksConfig {
    /// Database writer for decoded packets
    pub db: Option<DbSinkConfig>,

    /// Message-queue publisher for raw HEP frames
    pub mq: Option<MqSinkConfig>,

    /// Metrics exporter with a scrape endpoint
    pub metrics: Option<MetricsSinkConfig>,
}

/// Database sink configuration
///
/// # Example
///
/// ```toml
/// [sinks.db]
/// driver = "postgres"
/// addr = "localhost:5432"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DbSinkConfig {
    /// Database driver name (opaque to the ingest core)
    pub driver: String,

    /// Database server address
    pub addr: String,
}

/// Message queue sink configuration
///
/// The publisher receives the raw wire bytes so downstream consumers can
/// re-decode the original HEP frame.
///
/// # Example
///
/// ```toml
/// [sinks.mq]
/// name = "nsq"
/// addr = "localhost:4150"
/// topic = "hep"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MqSinkConfig {
    /// Queue system name (opaque to the ingest core)
    pub name: String,

    /// Queue server address
    pub addr: String,

    /// Topic the raw frames are published under
    pub topic: String,
}

/// Metrics sink configuration
///
/// # Example
///
/// ```toml
/// [sinks.metrics]
/// addr = "0.0.0.0:9096"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSinkConfig {
    /// Bind address for the scrape endpoint
    pub addr: String,
}
