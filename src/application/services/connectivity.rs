use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Tracks platform-reported connectivity. Purely advisory: nothing blocks
/// on it, and downstream writes still attempt the remote store and fall
/// back to queueing regardless of what it reports.
pub struct ConnectivityMonitor {
    online: AtomicBool,
    sender: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    /// `initial` comes from the platform's network-status primitive.
    pub fn new(initial: bool) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            online: AtomicBool::new(initial),
            sender,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Records the new state and returns `true` exactly when this call was
    /// an offline-to-online transition. Repeated reports of the same state
    /// produce no edge and no channel notification.
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            // send_replace records the value even when nobody watches yet.
            self.sender.send_replace(online);
        }
        !previous && online
    }

    /// Receiver that observes state transitions only, one value per change.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}
