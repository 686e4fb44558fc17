use std::sync::Arc;

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Gauge, GaugeVec};
use tracing::debug;

use crate::db::{Bridge, Collection};

lazy_static! {
    // ── Storage bridge ──────────────────────────────────────────────────────
    pub static ref BRIDGE_READS_COUNTER: CounterVec = register_counter_vec!(
        "bridge_reads_total",
        "Collection reads by collection and serving backend",
        &["collection", "backend"]
    ).unwrap();

    pub static ref BRIDGE_WRITES_COUNTER: CounterVec = register_counter_vec!(
        "bridge_writes_total",
        "Collection writes by collection and outcome (remote, local, dropped)",
        &["collection", "outcome"]
    ).unwrap();

    pub static ref REMOTE_READY_GAUGE: Gauge = register_gauge!(
        "bridge_remote_ready",
        "1 when the remote document store is serving, 0 when on the local snapshot"
    ).unwrap();

    // ── Menu planning ───────────────────────────────────────────────────────
    pub static ref PUBLISHES_COUNTER: CounterVec = register_counter_vec!(
        "schedule_publishes_total",
        "Weekly schedule publishes by status",
        &["status"]
    ).unwrap();

    pub static ref COLLECTION_SIZE_GAUGE: GaugeVec = register_gauge_vec!(
        "collection_records_total",
        "Records per collection as of the last collection pass",
        &["collection"]
    ).unwrap();
}

/// Spawn the background collector (refreshes every 5 minutes).
pub fn start(bridge: Arc<Bridge>) {
    tokio::spawn(async move {
        loop {
            collect(&bridge).await;
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
        }
    });
}

async fn collect(bridge: &Bridge) {
    REMOTE_READY_GAUGE.set(if bridge.remote_ready() { 1.0 } else { 0.0 });
    for c in Collection::ALL {
        let count = bridge.record_count(c).await;
        COLLECTION_SIZE_GAUGE
            .with_label_values(&[c.as_str()])
            .set(count as f64);
    }
    debug!("Metrics: collected sizes for {} collections", Collection::ALL.len());
}
