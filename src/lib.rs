//! Offline-aware data access core for the TeamDesk task/CRM application.
//!
//! Reads flow in over push subscriptions from a remote keyed store and are
//! normalized into id-carrying records. Writes are optimistic: the remote
//! store is tried first, and a failure while offline lands in a durable
//! local queue that replays when connectivity returns. Notification "seen"
//! state layers a per-user union-merge map on top of the same facade.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{QueueStorage, RemoteStore, SubscriptionId};
pub use application::services::{
    AddOutcome, ConnectivityMonitor, DataAccessFacade, DataSubscription, OperationQueue,
    ReplayReport, SeenStateService, WriteOutcome,
};
pub use domain::entities::{Notification, QueueItem, QueuedOp, Record, Snapshot};
pub use domain::value_objects::{PendingId, QueueItemId, RecordId, StorePath, UserId};
pub use shared::config::AppConfig;
pub use shared::error::AppError;
