use crate::application::ports::remote_store::{RemoteStore, SubscriptionId, ValueHandler};
use crate::application::services::connectivity::ConnectivityMonitor;
use crate::application::services::operation_queue::{OperationQueue, ReplayReport};
use crate::domain::entities::{QueuedOp, Snapshot};
use crate::domain::value_objects::{PendingId, QueueItemId, RecordId, StorePath};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use crate::infrastructure::storage::FileQueueStorage;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub type SnapshotHandler = Arc<dyn Fn(Snapshot) + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(AppError) + Send + Sync>;

/// Result of `add_data`. An offline add hands back a placeholder, not the
/// record's eventual key; the two variants keep that discontinuity visible
/// instead of burying it in one string.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// The store accepted the write and assigned this key.
    Stored(RecordId),
    /// Queued for replay; the placeholder never matches the eventual key.
    Queued(PendingId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Stored,
    Queued(QueueItemId),
}

/// Handle for one live `fetch_data` subscription. `unsubscribe` is the
/// only cancellation primitive; it is idempotent and never surfaces an
/// error, since teardown paths must not crash. Dropping the handle without
/// calling it leaves the remote registration alive.
pub struct DataSubscription {
    store: Arc<dyn RemoteStore>,
    id: SubscriptionId,
    active: AtomicBool,
}

impl DataSubscription {
    pub async fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.store.unsubscribe(self.id).await {
            warn!("Unsubscribe failed (ignored): {}", e);
        }
    }
}

/// The public data surface: push-based reads plus optimistic writes with
/// an offline fallback. Writes try the remote store first; a failure while
/// the platform reports offline becomes a queued operation, a failure
/// while online propagates to the caller.
pub struct DataAccessFacade {
    store: Arc<dyn RemoteStore>,
    queue: Arc<OperationQueue>,
    connectivity: Arc<ConnectivityMonitor>,
}

impl DataAccessFacade {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        queue: Arc<OperationQueue>,
        connectivity: Arc<ConnectivityMonitor>,
    ) -> Self {
        Self {
            store,
            queue,
            connectivity,
        }
    }

    /// Wires the facade from configuration: file-backed queue storage under
    /// the configured data dir, and an app-start replay when configured and
    /// currently online.
    pub async fn bootstrap(
        store: Arc<dyn RemoteStore>,
        config: &AppConfig,
        initially_online: bool,
    ) -> Arc<Self> {
        let connectivity = Arc::new(ConnectivityMonitor::new(initially_online));
        let storage = Arc::new(FileQueueStorage::new(config.storage.queue_path()));
        let queue = Arc::new(OperationQueue::load(storage, connectivity.clone()).await);
        let facade = Arc::new(Self::new(store, queue, connectivity));

        if config.sync.replay_on_start {
            let report = facade.replay_pending().await;
            if report.attempted > 0 {
                info!(
                    "Start-up replay: {} replayed, {} still pending",
                    report.replayed, report.failed
                );
            }
        }
        facade
    }

    /// Subscribes to `path`. Each push is normalized into a `Snapshot`;
    /// processing errors go to `on_error` (or a log when absent) without
    /// tearing the subscription down.
    pub async fn fetch_data(
        &self,
        path: &StorePath,
        on_data: SnapshotHandler,
        on_error: Option<ErrorHandler>,
    ) -> Result<DataSubscription, AppError> {
        let subscribed_path = path.clone();
        let handler: ValueHandler = Arc::new(move |value| {
            match Snapshot::from_value(value) {
                Ok(snapshot) => on_data(snapshot),
                Err(e) => {
                    let error =
                        AppError::ValidationError(format!("Bad snapshot at {subscribed_path}: {e}"));
                    match &on_error {
                        Some(on_error) => on_error(error),
                        None => warn!("{}", error),
                    }
                }
            }
        });

        let id = self.store.subscribe(path, handler).await?;
        Ok(DataSubscription {
            store: self.store.clone(),
            id,
            active: AtomicBool::new(true),
        })
    }

    /// Appends a record to the collection at `path`.
    pub async fn add_data(&self, path: &StorePath, data: Value) -> Result<AddOutcome, AppError> {
        match self.store.push_append(path, data.clone()).await {
            Ok(id) => Ok(AddOutcome::Stored(id)),
            Err(e) if !self.connectivity.is_online() => {
                debug!("Offline add at {}, queueing: {}", path, e);
                self.queue.enqueue(QueuedOp::Add { data }, path.clone()).await;
                Ok(AddOutcome::Queued(PendingId::generate()))
            }
            Err(e) => Err(e),
        }
    }

    /// Partial-field update of the record `id` under `path`.
    pub async fn update_data(
        &self,
        path: &StorePath,
        id: &RecordId,
        partial: Map<String, Value>,
    ) -> Result<WriteOutcome, AppError> {
        let record_path = path.join(id.as_str()).map_err(AppError::InvalidInput)?;
        match self.store.patch(&record_path, partial.clone()).await {
            Ok(()) => Ok(WriteOutcome::Stored),
            Err(e) if !self.connectivity.is_online() => {
                debug!("Offline update at {}, queueing: {}", record_path, e);
                let queued = self
                    .queue
                    .enqueue(QueuedOp::Update { data: partial }, record_path)
                    .await;
                Ok(WriteOutcome::Queued(queued))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn remove_data(
        &self,
        path: &StorePath,
        id: &RecordId,
    ) -> Result<WriteOutcome, AppError> {
        let record_path = path.join(id.as_str()).map_err(AppError::InvalidInput)?;
        match self.store.delete(&record_path).await {
            Ok(()) => Ok(WriteOutcome::Stored),
            Err(e) if !self.connectivity.is_online() => {
                debug!("Offline remove at {}, queueing: {}", record_path, e);
                let queued = self.queue.enqueue(QueuedOp::Remove, record_path).await;
                Ok(WriteOutcome::Queued(queued))
            }
            Err(e) => Err(e),
        }
    }

    /// Feeds a platform connectivity report in. An offline-to-online edge
    /// with pending operations triggers a replay; disabling only logs.
    pub async fn set_network_enabled(&self, enabled: bool) -> ReplayReport {
        let came_online = self.connectivity.set_online(enabled);
        if !enabled {
            info!("Network disabled; writes will queue locally");
            return ReplayReport::default();
        }
        if came_online && self.queue.has_pending().await {
            info!("Back online, replaying {} operations", self.queue.len().await);
            return self.replay_pending().await;
        }
        ReplayReport::default()
    }

    /// Explicit replay trigger (app start, connectivity edge).
    pub async fn replay_pending(&self) -> ReplayReport {
        self.queue.replay(self.store.as_ref()).await
    }

    /// Background watcher that replays on every offline-to-online edge.
    pub fn spawn_replay_on_reconnect(self: &Arc<Self>) -> JoinHandle<()> {
        let facade = self.clone();
        let mut receiver = facade.connectivity.watch();
        tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let online = *receiver.borrow_and_update();
                if online {
                    let report = facade.replay_pending().await;
                    if report.attempted > 0 {
                        info!(
                            "Reconnect replay: {} replayed, {} still pending",
                            report.replayed, report.failed
                        );
                    }
                }
            }
        })
    }

    /// One-time seed: writes `default_data` at the root only when the root
    /// holds nothing. Existence check, not a merge. Returns whether the
    /// seed was written.
    pub async fn initialize_database(&self, default_data: Value) -> Result<bool, AppError> {
        let root = StorePath::root();
        if self.store.read_once(&root).await?.is_some() {
            return Ok(false);
        }
        self.store.write(&root, default_data).await?;
        info!("Seeded database with default data");
        Ok(true)
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub async fn pending_operations(&self) -> usize {
        self.queue.len().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::remote::MemoryRemoteStore;
    use crate::infrastructure::storage::MemoryQueueStorage;
    use serde_json::json;
    use std::sync::Mutex;

    fn path(p: &str) -> StorePath {
        StorePath::new(p).unwrap()
    }

    struct Harness {
        store: Arc<MemoryRemoteStore>,
        facade: Arc<DataAccessFacade>,
    }

    async fn harness(online: bool) -> Harness {
        let store = Arc::new(MemoryRemoteStore::new());
        let connectivity = Arc::new(ConnectivityMonitor::new(online));
        let queue = Arc::new(
            OperationQueue::load(Arc::new(MemoryQueueStorage::new()), connectivity.clone()).await,
        );
        let facade = Arc::new(DataAccessFacade::new(
            store.clone(),
            queue,
            connectivity,
        ));
        Harness { store, facade }
    }

    fn snapshot_sink() -> (SnapshotHandler, Arc<Mutex<Vec<Snapshot>>>) {
        let seen: Arc<Mutex<Vec<Snapshot>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: SnapshotHandler = Arc::new(move |snapshot| {
            sink.lock().unwrap().push(snapshot);
        });
        (handler, seen)
    }

    #[tokio::test]
    async fn test_fetch_data_normalizes_collection() {
        let h = harness(true).await;
        h.store
            .write(&path("tasks/a"), json!({"title": "first"}))
            .await
            .unwrap();

        let (handler, seen) = snapshot_sink();
        let sub = h
            .facade
            .fetch_data(&path("tasks"), handler, None)
            .await
            .unwrap();

        h.store
            .write(&path("tasks/b"), json!({"title": "second"}))
            .await
            .unwrap();
        sub.unsubscribe().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let records = seen[1].records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_str(), "a");
        assert_eq!(records[1].id.as_str(), "b");
        assert_eq!(records[1].field("title"), Some(&json!("second")));
    }

    #[tokio::test]
    async fn test_fetch_data_reports_empty_path() {
        let h = harness(true).await;
        let (handler, seen) = snapshot_sink();
        h.facade
            .fetch_data(&path("tasks"), handler, None)
            .await
            .unwrap();
        assert_eq!(seen.lock().unwrap()[0], Snapshot::Empty);
    }

    #[tokio::test]
    async fn test_unsubscribe_twice_is_harmless() {
        let h = harness(true).await;
        let (handler, seen) = snapshot_sink();
        let sub = h
            .facade
            .fetch_data(&path("tasks"), handler, None)
            .await
            .unwrap();

        sub.unsubscribe().await;
        sub.unsubscribe().await;

        h.store.write(&path("tasks/a"), json!({})).await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_while_online_returns_store_key() {
        let h = harness(true).await;
        let outcome = h
            .facade
            .add_data(&path("tasks"), json!({"title": "X"}))
            .await
            .unwrap();
        match outcome {
            AddOutcome::Stored(id) => assert!(!id.as_str().starts_with("pending-")),
            AddOutcome::Queued(_) => panic!("online add must not queue"),
        }
    }

    #[tokio::test]
    async fn test_add_while_offline_queues_and_returns_placeholder() {
        let h = harness(false).await;
        h.store.set_available(false);

        let outcome = h
            .facade
            .add_data(&path("tasks"), json!({"title": "X"}))
            .await
            .unwrap();
        match outcome {
            AddOutcome::Queued(pending) => {
                assert!(pending.as_str().starts_with("pending-"));
            }
            AddOutcome::Stored(_) => panic!("offline add must queue"),
        }
        assert_eq!(h.facade.pending_operations().await, 1);
    }

    #[tokio::test]
    async fn test_online_failure_propagates() {
        let h = harness(true).await;
        h.store.set_available(false); // backend down, platform says online

        let err = h
            .facade
            .add_data(&path("tasks"), json!({}))
            .await
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(h.facade.pending_operations().await, 0);
    }

    #[tokio::test]
    async fn test_update_and_remove_queue_while_offline() {
        let h = harness(false).await;
        h.store.set_available(false);

        let id = RecordId::new("t1").unwrap();
        let mut partial = Map::new();
        partial.insert("done".to_string(), json!(true));

        let updated = h
            .facade
            .update_data(&path("tasks"), &id, partial)
            .await
            .unwrap();
        assert!(matches!(updated, WriteOutcome::Queued(_)));

        let removed = h.facade.remove_data(&path("tasks"), &id).await.unwrap();
        assert!(matches!(removed, WriteOutcome::Queued(_)));

        let items = h.facade.queue.items().await;
        assert_eq!(items.len(), 2);
        // Queued record operations carry the pre-joined path.
        assert!(items.iter().all(|item| item.path == path("tasks/t1")));
    }

    #[tokio::test]
    async fn test_set_network_enabled_replays_pending() {
        let h = harness(false).await;
        h.store.set_available(false);
        h.facade
            .add_data(&path("tasks"), json!({"title": "X"}))
            .await
            .unwrap();

        h.store.set_available(true);
        let report = h.facade.set_network_enabled(true).await;

        assert_eq!(report.replayed, 1);
        assert_eq!(h.facade.pending_operations().await, 0);
    }

    #[tokio::test]
    async fn test_bootstrap_replays_at_start_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.data_dir = dir.path().to_string_lossy().into_owned();

        // First session queues an add while offline.
        let store = Arc::new(MemoryRemoteStore::new());
        store.set_available(false);
        let offline_config = AppConfig {
            sync: crate::shared::config::SyncConfig {
                replay_on_start: false,
            },
            ..config.clone()
        };
        let first = DataAccessFacade::bootstrap(store.clone(), &offline_config, false).await;
        first
            .add_data(&path("tasks"), json!({"title": "X"}))
            .await
            .unwrap();
        assert_eq!(first.pending_operations().await, 1);

        // Next session starts online over the same queue file and drains it.
        store.set_available(true);
        let second = DataAccessFacade::bootstrap(store.clone(), &config, true).await;
        assert_eq!(second.pending_operations().await, 0);
        assert!(store
            .read_once(&path("tasks"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_initialize_database_seeds_only_once() {
        let h = harness(true).await;
        let seed = json!({"tasks": {"t1": {"title": "welcome"}}});

        assert!(h.facade.initialize_database(seed.clone()).await.unwrap());
        assert!(!h.facade.initialize_database(json!({"other": 1})).await.unwrap());

        assert_eq!(
            h.store.read_once(&path("tasks/t1")).await.unwrap(),
            Some(json!({"title": "welcome"}))
        );
    }
}
