//! HEP listener configuration

use std::time::Duration;

use serde::Deserialize;

/// HEP ingest configuration
///
/// # Example
///
/// ```toml
/// [hep]
/// addr = "0.0.0.0:9060"
/// workers = 0              # 0 = one per available core
/// queue_size = 10000
/// stats_interval = "60s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HepConfig {
    /// UDP bind address for ingest
    /// Default: "0.0.0.0:9060"
    pub addr: String,

    /// Number of decode workers; 0 selects the available parallelism
    /// Default: 0
    pub workers: usize,

    /// Inbound queue capacity between the receiver and the workers
    /// Default: 10000
    pub queue_size: usize,

    /// Interval between packet-stats log lines
    /// Default: 60s
    #[serde(with = "humantime_serde")]
    pub stats_interval: Duration,
}

impl Default for HepConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:9060".into(),
            workers: 0,
            queue_size: 10_000,
            stats_interval: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HepConfig::default();
        assert_eq!(config.addr, "0.0.0.0:9060");
        assert_eq!(config.workers, 0);
        assert_eq!(config.queue_size, 10_000);
        assert_eq!(config.stats_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_deserialize_interval() {
        let config: HepConfig = toml::from_str("stats_interval = \"90s\"").unwrap();
        assert_eq!(config.stats_interval, Duration::from_secs(90));
    }
}
