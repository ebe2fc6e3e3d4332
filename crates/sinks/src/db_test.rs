//! Tests for the database sink

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hepflow_protocol::HepPacket;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::db::{DbSink, DbSinkConfig, MemoryStore, PacketStore};
use crate::{Result, SinkError};

fn test_config() -> DbSinkConfig {
    DbSinkConfig {
        batch_size: 4,
        flush_interval: Duration::from_millis(20),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_batches_reach_store() {
    let (tx, rx) = mpsc::channel(64);
    let store = MemoryStore::default();
    let sink = DbSink::new(test_config(), rx, Box::new(store.clone()));
    let metrics = sink.metrics();
    let handle = tokio::spawn(sink.run());

    for i in 0..10u32 {
        let packet = Arc::new(HepPacket {
            node_id: i,
            ..Default::default()
        });
        tx.send(packet).await.unwrap();
    }
    drop(tx);

    timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();

    let stored = store.stored();
    assert_eq!(stored.len(), 10);
    assert_eq!(stored[9].node_id, 9);
    assert_eq!(metrics.packets_written.load(Ordering::Relaxed), 10);
    // 10 packets with a batch size of 4: two full batches plus the tail
    assert!(metrics.batches_written.load(Ordering::Relaxed) >= 3);
}

#[tokio::test]
async fn test_partial_batch_flushed_on_interval() {
    let (tx, rx) = mpsc::channel(64);
    let store = MemoryStore::default();
    let sink = DbSink::new(test_config(), rx, Box::new(store.clone()));
    let _handle = tokio::spawn(sink.run());

    tx.send(Arc::new(HepPacket::default())).await.unwrap();

    // One packet is well below batch_size; the interval flushes it
    timeout(Duration::from_secs(2), async {
        while store.stored().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

struct FailingStore;

#[async_trait]
impl PacketStore for FailingStore {
    async fn store(&mut self, _packets: &[Arc<HepPacket>]) -> Result<()> {
        Err(SinkError::backend("connection refused"))
    }
}

#[tokio::test]
async fn test_store_errors_counted_not_fatal() {
    let (tx, rx) = mpsc::channel(64);
    let sink = DbSink::new(test_config(), rx, Box::new(FailingStore));
    let metrics = sink.metrics();
    let handle = tokio::spawn(sink.run());

    for _ in 0..8 {
        tx.send(Arc::new(HepPacket::default())).await.unwrap();
    }
    drop(tx);

    // The sink survives every failed batch and exits on queue close
    timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    assert!(metrics.write_errors.load(Ordering::Relaxed) >= 1);
    assert_eq!(metrics.packets_written.load(Ordering::Relaxed), 0);
}
