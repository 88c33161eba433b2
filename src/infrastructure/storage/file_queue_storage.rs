use crate::application::ports::QueueStorage;
use crate::domain::entities::QueueItem;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::error;

/// File-backed queue slot: one JSON array, rewritten whole on every
/// change. Writes go through a temp file plus rename so a crash mid-write
/// leaves the previous blob intact rather than a torn one.
pub struct FileQueueStorage {
    path: PathBuf,
}

impl FileQueueStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl QueueStorage for FileQueueStorage {
    async fn load(&self) -> Result<Vec<QueueItem>, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                // A corrupt blob must not brick the write path; queueing
                // keeps working over an empty queue.
                error!("Discarding corrupt queue file {:?}: {}", self.path, e);
                Ok(Vec::new())
            }
        }
    }

    async fn store(&self, items: &[QueueItem]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let encoded = serde_json::to_vec(items)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &encoded).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}
