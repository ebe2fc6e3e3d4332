//! Configuration validation
//!
//! Runs after parsing; violations abort startup.

use std::net::SocketAddr;

use crate::{Config, ConfigError, Result};

/// Validate a parsed configuration
pub fn validate_config(config: &Config) -> Result<()> {
    parse_addr("hep.addr", &config.hep.addr)?;

    if config.hep.queue_size == 0 {
        return Err(ConfigError::Validation(
            "hep.queue_size must be greater than zero".into(),
        ));
    }

    if let Some(db) = &config.sinks.db {
        require("sinks.db.driver", &db.driver)?;
        require("sinks.db.addr", &db.addr)?;
    }

    if let Some(mq) = &config.sinks.mq {
        require("sinks.mq.name", &mq.name)?;
        require("sinks.mq.addr", &mq.addr)?;
        require("sinks.mq.topic", &mq.topic)?;
    }

    if let Some(metrics) = &config.sinks.metrics {
        parse_addr("sinks.metrics.addr", &metrics.addr)?;
    }

    Ok(())
}

fn parse_addr(field: &str, value: &str) -> Result<SocketAddr> {
    value.parse().map_err(|_| {
        ConfigError::Validation(format!("{field} is not a valid socket address: {value:?}"))
    })
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
