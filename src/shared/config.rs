use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub queue_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Replay queued writes as part of facade construction (app-start trigger).
    pub replay_on_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                queue_file: "operation_queue.json".to_string(),
            },
            sync: SyncConfig {
                replay_on_start: true,
            },
        }
    }
}

impl StorageConfig {
    pub fn queue_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.queue_file)
    }
}
