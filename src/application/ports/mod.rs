pub mod queue_storage;
pub mod remote_store;

pub use queue_storage::QueueStorage;
pub use remote_store::{RemoteStore, SubscriptionId, ValueHandler};
