use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::{local::LocalSnapshot, remote::RemoteStore, Backend, Collection, Record, Served, WriteOutcome};
use crate::config::StorageConfig;
use crate::services::metrics::{BRIDGE_READS_COUNTER, BRIDGE_WRITES_COUNTER};

/// Routes collection reads and writes to the remote store when it is
/// reachable and to the local snapshot otherwise.
///
/// Reads and writes decide independently, per call. A remote failure only
/// affects the call that hit it; the ready flag is changed by probes, not by
/// ordinary traffic. Nothing is ever written to both backends and nothing
/// reconciles them afterwards.
pub struct Bridge {
    local: LocalSnapshot,
    remote: Option<RemoteStore>,
    remote_ready: AtomicBool,
    reprobe_every: Option<Duration>,
    last_probe: Mutex<Option<Instant>>,
}

impl Bridge {
    pub fn new(local: LocalSnapshot, remote: Option<RemoteStore>, reprobe_every: Option<Duration>) -> Self {
        Self {
            local,
            remote,
            remote_ready: AtomicBool::new(false),
            reprobe_every,
            last_probe: Mutex::new(None),
        }
    }

    pub fn from_config(config: &StorageConfig) -> anyhow::Result<Self> {
        let remote = match &config.remote_url {
            Some(url) => Some(RemoteStore::new(url, config.remote_auth.clone(), config.remote_timeout)?),
            None => None,
        };
        Ok(Self::new(
            LocalSnapshot::new(&config.snapshot_path),
            remote,
            config.reprobe_every,
        ))
    }

    /// A bridge that never talks to a remote store.
    pub fn local_only(local: LocalSnapshot) -> Self {
        Self::new(local, None, None)
    }

    /// Startup: make sure the snapshot file exists, then probe the remote
    /// store once and record the answer.
    pub async fn init(&self) {
        if let Err(e) = self.local.ensure_initialized().await {
            error!("Could not initialize local snapshot {:?}: {e}", self.local.path());
        }
        match &self.remote {
            Some(_) => {
                if self.probe().await {
                    info!("Remote document store connected");
                } else {
                    warn!("Remote document store unreachable, serving from local snapshot");
                }
            }
            None => info!("No remote store configured, serving from local snapshot"),
        }
    }

    pub fn remote_ready(&self) -> bool {
        self.remote.is_some() && self.remote_ready.load(Ordering::Relaxed)
    }

    /// Overrides the ready flag, e.g. to force local mode during maintenance.
    pub fn set_remote_ready(&self, ready: bool) {
        self.remote_ready.store(ready, Ordering::Relaxed);
    }

    pub fn remote(&self) -> Option<&RemoteStore> {
        self.remote.as_ref()
    }

    async fn probe(&self) -> bool {
        let Some(remote) = &self.remote else {
            return false;
        };
        if let Ok(mut last) = self.last_probe.lock() {
            *last = Some(Instant::now());
        }
        let ok = match remote.probe().await {
            Ok(()) => true,
            Err(e) => {
                debug!("Remote probe failed: {e}");
                false
            }
        };
        self.remote_ready.store(ok, Ordering::Relaxed);
        ok
    }

    /// Returns the remote store if it should serve this call, re-probing
    /// lazily when it is down and the re-probe interval has elapsed.
    async fn active_remote(&self) -> Option<&RemoteStore> {
        let remote = self.remote.as_ref()?;
        if self.remote_ready.load(Ordering::Relaxed) {
            return Some(remote);
        }
        let interval = self.reprobe_every?;
        let due = match self.last_probe.lock() {
            Ok(last) => last.map_or(true, |t| t.elapsed() >= interval),
            Err(_) => false,
        };
        if due && self.probe().await {
            info!("Remote document store reachable again");
            return Some(remote);
        }
        None
    }

    /// Reads a whole collection. Never fails: a remote error falls back to
    /// the local snapshot, and a local error yields an empty list.
    pub async fn get(&self, collection: Collection) -> Served<Vec<Record>> {
        let remote = self.active_remote().await;
        let served = self.read_from(remote, collection).await;
        BRIDGE_READS_COUNTER
            .with_label_values(&[collection.as_str(), served.backend.as_str()])
            .inc();
        served
    }

    /// Number of records in a collection, for the metrics pass. Uses the
    /// backend serving right now without re-probing and is not counted as a
    /// read.
    pub async fn record_count(&self, collection: Collection) -> usize {
        let remote = if self.remote_ready() { self.remote.as_ref() } else { None };
        self.read_from(remote, collection).await.value.len()
    }

    async fn read_from(&self, remote: Option<&RemoteStore>, collection: Collection) -> Served<Vec<Record>> {
        if let Some(remote) = remote {
            match remote.fetch(collection).await {
                Ok(records) => {
                    return Served {
                        value: records,
                        backend: Backend::Remote,
                    }
                }
                Err(e) => warn!("Remote read of {collection} failed, using local snapshot: {e}"),
            }
        }
        Served {
            value: self.local.read(collection).await,
            backend: Backend::Local,
        }
    }

    /// Replaces a whole collection with `records`, on the remote store if it
    /// is up and otherwise on the local snapshot.
    pub async fn save(&self, collection: Collection, records: &[Record]) -> WriteOutcome {
        let mut outcome = WriteOutcome::Dropped;
        if let Some(remote) = self.active_remote().await {
            match remote.replace(collection, records).await {
                Ok(()) => outcome = WriteOutcome::Remote,
                Err(e) => warn!("Remote write of {collection} failed, using local snapshot: {e}"),
            }
        }
        if outcome == WriteOutcome::Dropped {
            outcome = match self.local.write(collection, records).await {
                Ok(()) => WriteOutcome::Local,
                Err(e) => {
                    error!("Error writing {collection} to local snapshot: {e}");
                    WriteOutcome::Dropped
                }
            };
        }
        BRIDGE_WRITES_COUNTER
            .with_label_values(&[collection.as_str(), outcome.as_str()])
            .inc();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::FakeStore;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(v: serde_json::Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    fn unreachable_remote() -> RemoteStore {
        RemoteStore::new("http://127.0.0.1:1", None, Duration::from_millis(500)).unwrap()
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips_every_collection() {
        let dir = TempDir::new().unwrap();
        let bridge = Bridge::local_only(LocalSnapshot::new(dir.path().join("db.json")));
        bridge.init().await;

        for c in Collection::ALL {
            let records = vec![
                record(json!({ "_id": "a", "n": 1 })),
                record(json!({ "id": 2, "nested": { "k": [1, 2] } })),
            ];
            assert_eq!(bridge.save(c, &records).await, WriteOutcome::Local);
            let served = bridge.get(c).await;
            assert_eq!(served.backend, Backend::Local);
            assert_eq!(served.value, records);
        }
    }

    #[tokio::test]
    async fn test_forced_ready_with_dead_remote_falls_back_to_local() {
        let dir = TempDir::new().unwrap();
        let bridge = Bridge::new(
            LocalSnapshot::new(dir.path().join("db.json")),
            Some(unreachable_remote()),
            None,
        );
        bridge.init().await;
        assert!(!bridge.remote_ready());

        // pretend the startup probe succeeded and the store went away afterwards
        bridge.set_remote_ready(true);
        let meals = vec![record(json!({ "_id": "m1", "name": "Poha" }))];
        assert_eq!(bridge.save(Collection::Meals, &meals).await, WriteOutcome::Local);

        let served = bridge.get(Collection::Meals).await;
        assert_eq!(served.backend, Backend::Local);
        assert_eq!(served.value, meals);
        // per-call failures do not flip the flag
        assert!(bridge.remote_ready());
    }

    #[tokio::test]
    async fn test_unwritable_snapshot_drops_write_and_reads_empty() {
        let dir = TempDir::new().unwrap();
        // a directory where the file should be makes every file operation fail
        let path = dir.path().join("db.json");
        std::fs::create_dir(&path).unwrap();
        let bridge = Bridge::local_only(LocalSnapshot::new(&path));

        let outcome = bridge.save(Collection::Menus, &[record(json!({ "_id": "x" }))]).await;
        assert_eq!(outcome, WriteOutcome::Dropped);
        assert!(!outcome.is_committed());
        assert!(bridge.get(Collection::Menus).await.value.is_empty());
    }

    #[tokio::test]
    async fn test_remote_read_orders_keyed_records_and_synthesizes_ids() {
        let dir = TempDir::new().unwrap();
        let store = FakeStore::start(1).await;
        store.set(
            "meals",
            json!({
                "-Na": { "name": "Idli" },
                "-Nb": { "_id": "m2", "name": "Dosa" }
            }),
        );
        let remote = RemoteStore::new(&store.url, None, Duration::from_secs(2)).unwrap();
        let bridge = Bridge::new(LocalSnapshot::new(dir.path().join("db.json")), Some(remote), None);
        bridge.init().await;
        assert!(bridge.remote_ready());

        let served = bridge.get(Collection::Meals).await;
        assert_eq!(served.backend, Backend::Remote);
        let ids: Vec<_> = served.value.iter().filter_map(crate::db::record_id).collect();
        assert_eq!(ids, vec!["-Na", "m2"]);
        assert_eq!(served.value[0]["name"], "Idli");

        let events = vec![record(json!({ "_id": "e1", "title": "Biryani night" }))];
        assert_eq!(bridge.save(Collection::Events, &events).await, WriteOutcome::Remote);
        assert_eq!(store.doc("events"), json!([{ "_id": "e1", "title": "Biryani night" }]));
        // nothing reached the snapshot
        assert!(LocalSnapshot::new(dir.path().join("db.json")).read(Collection::Events).await.is_empty());
    }

    #[tokio::test]
    async fn test_record_count_leaves_remote_state_alone() {
        let dir = TempDir::new().unwrap();
        let bridge = Bridge::new(
            LocalSnapshot::new(dir.path().join("db.json")),
            Some(unreachable_remote()),
            Some(Duration::ZERO),
        );
        bridge.init().await;
        bridge.save(Collection::Waste, &[record(json!({ "_id": "w1" }))]).await;

        let before = *bridge.last_probe.lock().unwrap();
        assert_eq!(bridge.record_count(Collection::Waste).await, 1);
        assert_eq!(*bridge.last_probe.lock().unwrap(), before);
    }

    #[tokio::test]
    async fn test_reprobe_respects_interval() {
        let dir = TempDir::new().unwrap();
        let bridge = Bridge::new(
            LocalSnapshot::new(dir.path().join("db.json")),
            Some(unreachable_remote()),
            Some(Duration::from_secs(3600)),
        );
        bridge.init().await;
        let before = *bridge.last_probe.lock().unwrap();
        bridge.get(Collection::Users).await;
        let after = *bridge.last_probe.lock().unwrap();
        // the startup probe is recent, so no second probe happened
        assert_eq!(before, after);
    }
}
