mod pending_id;
mod queue_item_id;
mod record_id;
mod store_path;
mod user_id;

pub use pending_id::PendingId;
pub use queue_item_id::QueueItemId;
pub use record_id::RecordId;
pub use store_path::StorePath;
pub use user_id::UserId;
