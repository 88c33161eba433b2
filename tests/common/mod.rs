#![allow(dead_code)] // each test binary uses a subset of this harness

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use teamdesk_core::application::services::data_access::SnapshotHandler;
use teamdesk_core::infrastructure::remote::MemoryRemoteStore;
use teamdesk_core::infrastructure::storage::FileQueueStorage;
use teamdesk_core::{
    ConnectivityMonitor, DataAccessFacade, OperationQueue, Snapshot, StorePath,
};

pub struct TestEnv {
    pub store: Arc<MemoryRemoteStore>,
    pub facade: Arc<DataAccessFacade>,
    pub connectivity: Arc<ConnectivityMonitor>,
}

/// Facade over an in-memory store with a file-backed queue, so tests can
/// simulate a process restart by rebuilding over the same queue file.
pub async fn env(queue_file: PathBuf, online: bool) -> TestEnv {
    let store = Arc::new(MemoryRemoteStore::new());
    rebuild(store, queue_file, online).await
}

pub async fn rebuild(
    store: Arc<MemoryRemoteStore>,
    queue_file: PathBuf,
    online: bool,
) -> TestEnv {
    let connectivity = Arc::new(ConnectivityMonitor::new(online));
    let storage = Arc::new(FileQueueStorage::new(queue_file));
    let queue = Arc::new(OperationQueue::load(storage, connectivity.clone()).await);
    let facade = Arc::new(DataAccessFacade::new(
        store.clone(),
        queue,
        connectivity.clone(),
    ));
    TestEnv {
        store,
        facade,
        connectivity,
    }
}

impl TestEnv {
    /// Drops connectivity and makes the backend reject everything.
    pub fn go_offline(&self) {
        self.connectivity.set_online(false);
        self.store.set_available(false);
    }

    pub fn go_online(&self) {
        self.store.set_available(true);
        self.connectivity.set_online(true);
    }
}

pub fn path(p: &str) -> StorePath {
    StorePath::new(p).unwrap()
}

pub fn snapshot_sink() -> (SnapshotHandler, Arc<Mutex<Vec<Snapshot>>>) {
    let seen: Arc<Mutex<Vec<Snapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let handler: SnapshotHandler = Arc::new(move |snapshot| {
        sink.lock().unwrap().push(snapshot);
    });
    (handler, seen)
}
