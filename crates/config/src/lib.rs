//! hepflow configuration
//!
//! TOML-based configuration loading with sensible defaults. A minimal
//! config just works - only specify what you need to change.
//!
//! Sink sections follow a presence-enables rule: a sink consumer is started
//! if and only if its `[sinks.*]` table appears in the config.
//!
//! # Example Minimal Config
//!
//! ```toml
//! [hep]
//! addr = "0.0.0.0:9060"
//!
//! [sinks.db]
//! driver = "postgres"
//! addr = "localhost:5432"
//! ```

mod error;
mod hep;
mod logging;
mod sinks;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use hep::HepConfig;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use sinks::{DbSinkConfig, MetricsSinkConfig, MqSinkConfig, SinksConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// HEP listener and worker-pool settings
    pub hep: HepConfig,

    /// Sink consumers (database, message queue, metrics)
    pub sinks: SinksConfig,

    /// Optional error-reporting endpoint for decode failures
    pub sentry_dsn: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks bind addresses parse and enabled sink sections carry their
    /// required fields. Violations are fatal at startup.
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Get list of enabled sink names
    pub fn enabled_sinks(&self) -> Vec<&'static str> {
        let mut enabled = Vec::new();
        if self.sinks.db.is_some() {
            enabled.push("db");
        }
        if self.sinks.mq.is_some() {
            enabled.push("mq");
        }
        if self.sinks.metrics.is_some() {
            enabled.push("metrics");
        }
        enabled
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.hep.addr, "0.0.0.0:9060");
        assert_eq!(config.hep.queue_size, 10_000);
        assert!(config.sinks.db.is_none());
        assert!(config.enabled_sinks().is_empty());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_minimal_config() {
        let toml = r#"
[hep]
addr = "127.0.0.1:19060"
workers = 4

[sinks.db]
driver = "postgres"
addr = "localhost:5432"
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.hep.addr, "127.0.0.1:19060");
        assert_eq!(config.hep.workers, 4);
        assert_eq!(config.enabled_sinks(), vec!["db"]);
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
sentry_dsn = "https://key@sentry.example.com/1"

[log]
level = "debug"
format = "json"

[hep]
addr = "0.0.0.0:9060"
workers = 8
queue_size = 20000
stats_interval = "30s"

[sinks.db]
driver = "mysql"
addr = "db.example.com:3306"

[sinks.mq]
name = "nsq"
addr = "mq.example.com:4150"
topic = "hep"

[sinks.metrics]
addr = "0.0.0.0:9096"
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.hep.workers, 8);
        assert_eq!(config.hep.queue_size, 20_000);
        assert_eq!(config.hep.stats_interval.as_secs(), 30);
        assert_eq!(config.enabled_sinks(), vec!["db", "mq", "metrics"]);
        assert_eq!(config.sinks.mq.unwrap().topic, "hep");
        assert_eq!(
            config.sentry_dsn.as_deref(),
            Some("https://key@sentry.example.com/1")
        );
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(Config::from_str("[hep").is_err());
    }

    #[test]
    fn test_invalid_bind_addr_rejected() {
        let err = Config::from_str("[hep]\naddr = \"not-an-addr\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_incomplete_mq_sink_rejected() {
        let toml = r#"
[sinks.mq]
name = "nsq"
addr = ""
topic = "hep"
"#;
        assert!(Config::from_str(toml).is_err());
    }
}
