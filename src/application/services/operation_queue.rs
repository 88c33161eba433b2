use crate::application::ports::{QueueStorage, RemoteStore};
use crate::application::services::connectivity::ConnectivityMonitor;
use crate::domain::entities::{QueueItem, QueuedOp};
use crate::domain::value_objects::{QueueItemId, StorePath};
use crate::shared::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub attempted: usize,
    pub replayed: usize,
    pub failed: usize,
}

/// Durable FIFO of writes the remote store has not acknowledged yet.
///
/// The in-memory list is the working copy; every mutation is mirrored to
/// the storage slot so a restart picks up exactly the pending items. An
/// item leaves the queue only after its replay attempt succeeded.
pub struct OperationQueue {
    storage: Arc<dyn QueueStorage>,
    connectivity: Arc<ConnectivityMonitor>,
    items: Mutex<Vec<QueueItem>>,
    /// Held for a full clone-attempt-prune cycle. The app-start trigger,
    /// `set_network_enabled` and the reconnect watcher can all fire on the
    /// same edge; without this, overlapping replays would each see the
    /// same pending items and apply them twice.
    replay_guard: Mutex<()>,
}

impl OperationQueue {
    /// Loads persisted items. A storage failure here degrades to an empty
    /// queue with an error log; refusing to start would lose nothing that
    /// refusing to queue later would not lose twice over.
    pub async fn load(
        storage: Arc<dyn QueueStorage>,
        connectivity: Arc<ConnectivityMonitor>,
    ) -> Self {
        let items = match storage.load().await {
            Ok(items) => items,
            Err(e) => {
                error!("Failed to load operation queue, starting empty: {}", e);
                Vec::new()
            }
        };
        if !items.is_empty() {
            debug!("Loaded {} pending operations", items.len());
        }
        Self {
            storage,
            connectivity,
            items: Mutex::new(items),
            replay_guard: Mutex::new(()),
        }
    }

    /// Appends and persists a pending operation. This is the fallback path
    /// for failed writes, so it must not fail: a persistence error is
    /// logged and the item stays in memory for this process's lifetime.
    pub async fn enqueue(&self, op: QueuedOp, path: StorePath) -> QueueItemId {
        let item = QueueItem::new(op, path);
        let id = item.id.clone();

        let mut items = self.items.lock().await;
        debug!(
            "Queueing {} for {} ({} pending)",
            item.op.kind(),
            item.path,
            items.len() + 1
        );
        items.push(item);
        self.persist(&items).await;
        id
    }

    /// Re-attempts every queued item. No-op while offline or empty.
    ///
    /// Only one replay cycle runs at a time: a second trigger arriving
    /// while one is in flight waits for it and then finds the replayed
    /// items already pruned, so no item is ever applied twice.
    ///
    /// Items are grouped by target path: groups run concurrently, items
    /// within a group strictly in FIFO order so two offline updates to one
    /// record land in the order they were made. A failure stops its group
    /// (the items behind it keep their order for the next trigger) but
    /// never aborts sibling groups. Successes are pruned and the queue
    /// persisted once at the end.
    pub async fn replay(&self, store: &dyn RemoteStore) -> ReplayReport {
        let _cycle = self.replay_guard.lock().await;
        if !self.connectivity.is_online() {
            return ReplayReport::default();
        }

        let pending = self.items.lock().await.clone();
        if pending.is_empty() {
            return ReplayReport::default();
        }

        let mut groups: Vec<(StorePath, Vec<QueueItem>)> = Vec::new();
        for item in pending {
            match groups.iter_mut().find(|(path, _)| *path == item.path) {
                Some((_, group)) => group.push(item),
                None => groups.push((item.path.clone(), vec![item])),
            }
        }

        let attempts = groups
            .into_iter()
            .map(|(_, group)| Self::replay_group(store, group));
        let results = futures::future::join_all(attempts).await;

        let mut report = ReplayReport::default();
        let mut replayed: HashSet<QueueItemId> = HashSet::new();
        for group_result in results {
            report.attempted += group_result.attempted;
            report.failed += group_result.failed;
            replayed.extend(group_result.replayed);
        }
        report.replayed = replayed.len();

        if !replayed.is_empty() {
            let mut items = self.items.lock().await;
            items.retain(|item| !replayed.contains(&item.id));
            self.persist(&items).await;
        }
        debug!(
            "Replay finished: {} replayed, {} failed",
            report.replayed, report.failed
        );
        report
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn has_pending(&self) -> bool {
        !self.items.lock().await.is_empty()
    }

    /// Snapshot for diagnostics; the queue itself is not exposed mutably.
    pub async fn items(&self) -> Vec<QueueItem> {
        self.items.lock().await.clone()
    }

    async fn persist(&self, items: &[QueueItem]) {
        if let Err(e) = self.storage.store(items).await {
            error!("Failed to persist operation queue: {}", e);
        }
    }

    async fn replay_group(store: &dyn RemoteStore, group: Vec<QueueItem>) -> GroupResult {
        let mut result = GroupResult::default();
        for item in group {
            result.attempted += 1;
            match Self::attempt(store, &item).await {
                Ok(()) => result.replayed.push(item.id),
                Err(e) => {
                    warn!(
                        "Replay of {} {} failed, keeping queued: {}",
                        item.op.kind(),
                        item.path,
                        e
                    );
                    // Later items for this path stay queued too, so the
                    // record's writes keep their relative order.
                    result.failed += 1;
                    break;
                }
            }
        }
        result
    }

    async fn attempt(store: &dyn RemoteStore, item: &QueueItem) -> Result<(), AppError> {
        match &item.op {
            QueuedOp::Add { data } => {
                store.push_append(&item.path, data.clone()).await?;
                Ok(())
            }
            QueuedOp::Update { data } => store.patch(&item.path, data.clone()).await,
            QueuedOp::Remove => store.delete(&item.path).await,
        }
    }
}

#[derive(Default)]
struct GroupResult {
    attempted: usize,
    failed: usize,
    replayed: Vec<QueueItemId>,
}
