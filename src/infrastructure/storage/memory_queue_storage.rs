use crate::application::ports::QueueStorage;
use crate::domain::entities::QueueItem;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Volatile queue slot for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryQueueStorage {
    items: Mutex<Vec<QueueItem>>,
}

impl MemoryQueueStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStorage for MemoryQueueStorage {
    async fn load(&self) -> Result<Vec<QueueItem>, AppError> {
        Ok(self.items.lock().expect("queue storage lock").clone())
    }

    async fn store(&self, items: &[QueueItem]) -> Result<(), AppError> {
        *self.items.lock().expect("queue storage lock") = items.to_vec();
        Ok(())
    }
}
