//! hepflow - HEP capture server
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (UDP ingest on 0.0.0.0:9060, no sinks)
//! hepflow
//!
//! # Run with a config file
//! hepflow --config configs/hepflow.toml
//! ```

mod serve;

use anyhow::{Context, Result};
use clap::Parser;
use hepflow_config::{Config, LogFormat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// hepflow - HEP capture server
#[derive(Parser, Debug)]
#[command(name = "hepflow")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or_else(|| config.log.level.as_str());
    init_logging(level, config.log.format)?;

    serve::run(config).await
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }

    Ok(())
}
