use crate::domain::entities::QueueItem;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable slot for the operation queue: one JSON-serialized array, read
/// at startup and rewritten on every enqueue or replay prune. The queue is
/// the only source of truth for writes not yet acknowledged by the remote
/// store, so this slot must survive process restarts.
#[async_trait]
pub trait QueueStorage: Send + Sync {
    async fn load(&self) -> Result<Vec<QueueItem>, AppError>;
    async fn store(&self, items: &[QueueItem]) -> Result<(), AppError>;
}
