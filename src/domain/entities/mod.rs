mod notification;
mod queue_item;
mod record;

pub use notification::Notification;
pub use queue_item::{QueueItem, QueuedOp};
pub use record::{Record, Snapshot};
