//! Metrics sink
//!
//! Aggregates counters from decoded packets and serves them as
//! Prometheus-style text on a scrape endpoint. The registry is shared:
//! the sink task writes, the HTTP handler reads.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use hepflow_protocol::{chunk, HepPacket};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{Result, SinkError};

/// Shared counter registry behind the scrape endpoint
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Packets observed
    packets_total: AtomicU64,

    /// Payload bytes observed
    payload_bytes_total: AtomicU64,

    /// Packets by payload protocol type
    by_proto: RwLock<HashMap<u8, u64>>,

    /// SIP packets by unified method (request method or response code)
    sip_methods: RwLock<HashMap<String, u64>>,
}

impl MetricsRegistry {
    /// Fold one packet into the counters
    pub fn record(&self, packet: &HepPacket) {
        self.packets_total.fetch_add(1, Ordering::Relaxed);
        self.payload_bytes_total
            .fetch_add(packet.payload.len() as u64, Ordering::Relaxed);

        *self.by_proto.write().entry(packet.proto_type).or_insert(0) += 1;

        if let Some(method) = packet
            .sip
            .as_ref()
            .and_then(|m| m.start_line.as_ref())
            .map(|s| s.method.as_str())
        {
            if !method.is_empty() {
                *self
                    .sip_methods
                    .write()
                    .entry(method.to_owned())
                    .or_insert(0) += 1;
            }
        }
    }

    /// Total packets observed
    pub fn packets_total(&self) -> u64 {
        self.packets_total.load(Ordering::Relaxed)
    }

    /// Render the counters in Prometheus text exposition format
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(512);

        let _ = writeln!(out, "# TYPE hepflow_packets_total counter");
        let _ = writeln!(
            out,
            "hepflow_packets_total {}",
            self.packets_total.load(Ordering::Relaxed)
        );

        let _ = writeln!(out, "# TYPE hepflow_payload_bytes_total counter");
        let _ = writeln!(
            out,
            "hepflow_payload_bytes_total {}",
            self.payload_bytes_total.load(Ordering::Relaxed)
        );

        let _ = writeln!(out, "# TYPE hepflow_proto_packets_total counter");
        let by_proto = self.by_proto.read();
        let mut protos: Vec<_> = by_proto.iter().collect();
        protos.sort_by_key(|(proto, _)| **proto);
        for (proto, count) in protos {
            let _ = writeln!(
                out,
                "hepflow_proto_packets_total{{proto=\"{}\"}} {}",
                proto_label(*proto),
                count
            );
        }
        drop(by_proto);

        let _ = writeln!(out, "# TYPE hepflow_sip_method_packets_total counter");
        let methods = self.sip_methods.read();
        let mut sorted: Vec<_> = methods.iter().collect();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (method, count) in sorted {
            let _ = writeln!(
                out,
                "hepflow_sip_method_packets_total{{method=\"{}\"}} {}",
                method, count
            );
        }

        out
    }
}

/// Human label for a payload protocol type
fn proto_label(proto: u8) -> String {
    match proto {
        chunk::proto::SIP => "sip".into(),
        chunk::proto::RTCP => "rtcp".into(),
        chunk::proto::RTCP_XR => "rtcp_xr".into(),
        chunk::proto::DNS => "dns".into(),
        chunk::proto::LOG => "log".into(),
        other => other.to_string(),
    }
}

/// Consumer over the metrics queue
pub struct MetricsSink {
    receiver: mpsc::Receiver<Arc<HepPacket>>,
    registry: Arc<MetricsRegistry>,
}

impl MetricsSink {
    /// Create a sink feeding the given registry
    pub fn new(receiver: mpsc::Receiver<Arc<HepPacket>>, registry: Arc<MetricsRegistry>) -> Self {
        Self { receiver, registry }
    }

    /// Run until the queue closes
    pub async fn run(mut self) {
        info!("metrics sink starting");

        while let Some(packet) = self.receiver.recv().await {
            self.registry.record(&packet);
        }

        info!(
            packets = self.registry.packets_total(),
            "metrics sink shutting down"
        );
    }
}

/// Serve the scrape endpoint until cancellation
pub async fn serve_scrape(
    addr: String,
    registry: Arc<MetricsRegistry>,
    cancel: CancellationToken,
) -> Result<()> {
    let app = Router::new()
        .route("/metrics", get(scrape))
        .with_state(registry);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| SinkError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(addr = %addr, "metrics scrape endpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    Ok(())
}

async fn scrape(State(registry): State<Arc<MetricsRegistry>>) -> String {
    registry.render()
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;
