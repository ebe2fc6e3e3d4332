//! Server wiring
//!
//! Builds the ingest server from the loaded config, starts one consumer
//! task per enabled sink, and runs until ctrl-c.

use std::sync::Arc;

use anyhow::{Context, Result};
use hepflow_config::Config;
use hepflow_server::{HepServer, LogReporter, ServerConfig, SinkSet};
use hepflow_sinks::{
    db::DbSinkConfig, metrics::MetricsRegistry, mq::MqSinkConfig, serve_scrape, DbSink,
    LogPublisher, LogStore, MetricsSink, MqSink,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run the capture server until ctrl-c
pub async fn run(config: Config) -> Result<()> {
    let server_config = server_config_from(&config);

    info!(
        addr = %server_config.addr,
        sinks = ?config.enabled_sinks(),
        "starting hepflow"
    );

    let (server, mut queues) = HepServer::new(server_config);
    let server =
        server.with_reporter(Arc::new(LogReporter::new(config.sentry_dsn.clone())));

    let cancel = CancellationToken::new();
    let mut sink_tasks: Vec<JoinHandle<()>> = Vec::new();

    if let Some(db) = &config.sinks.db {
        let receiver = queues.db.take().context("db queue missing")?;
        let sink_config = DbSinkConfig {
            driver: db.driver.clone(),
            addr: db.addr.clone(),
            ..Default::default()
        };
        let sink = DbSink::new(sink_config, receiver, Box::new(LogStore));
        sink_tasks.push(tokio::spawn(sink.run()));
    }

    if let Some(mq) = &config.sinks.mq {
        let receiver = queues.mq.take().context("mq queue missing")?;
        let sink_config = MqSinkConfig {
            name: mq.name.clone(),
            addr: mq.addr.clone(),
            topic: mq.topic.clone(),
        };
        let sink = MqSink::new(sink_config, receiver, Box::new(LogPublisher));
        sink_tasks.push(tokio::spawn(sink.run()));
    }

    if let Some(metrics) = &config.sinks.metrics {
        let receiver = queues.metrics.take().context("metrics queue missing")?;
        let registry = Arc::new(MetricsRegistry::default());

        let sink = MetricsSink::new(receiver, Arc::clone(&registry));
        sink_tasks.push(tokio::spawn(sink.run()));

        let scrape_addr = metrics.addr.clone();
        let scrape_cancel = cancel.clone();
        sink_tasks.push(tokio::spawn(async move {
            if let Err(e) = serve_scrape(scrape_addr, registry, scrape_cancel).await {
                tracing::error!(error = %e, "metrics scrape endpoint failed");
            }
        }));
    }

    // Ctrl-c flips the token; the server drains and returns
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
                cancel.cancel();
            }
        });
    }

    server.run(cancel.clone()).await?;

    // Dropping the server drops the dispatcher, closing the sink queues so
    // every consumer drains and exits
    drop(server);
    cancel.cancel();
    for task in sink_tasks {
        let _ = task.await;
    }

    info!("hepflow stopped");
    Ok(())
}

/// Map the file config onto the ingest server's config
fn server_config_from(config: &Config) -> ServerConfig {
    ServerConfig {
        addr: config.hep.addr.clone(),
        workers: config.hep.workers,
        inbound_queue_size: config.hep.queue_size,
        stats_interval: config.hep.stats_interval,
        sinks: SinkSet {
            db: config.sinks.db.is_some(),
            mq: config.sinks.mq.is_some(),
            metrics: config.sinks.metrics.is_some(),
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_sink_enablement_follows_config_presence() {
        let config = Config::from_str(
            "[sinks.db]\ndriver = \"postgres\"\naddr = \"localhost:5432\"\n\
             [sinks.metrics]\naddr = \"0.0.0.0:9096\"",
        )
        .unwrap();

        let server_config = server_config_from(&config);
        assert!(server_config.sinks.db);
        assert!(!server_config.sinks.mq);
        assert!(server_config.sinks.metrics);
    }

    #[test]
    fn test_listener_settings_mapped() {
        let config = Config::from_str(
            "[hep]\naddr = \"127.0.0.1:19060\"\nworkers = 3\nqueue_size = 123",
        )
        .unwrap();

        let server_config = server_config_from(&config);
        assert_eq!(server_config.addr, "127.0.0.1:19060");
        assert_eq!(server_config.workers, 3);
        assert_eq!(server_config.inbound_queue_size, 123);
    }
}
