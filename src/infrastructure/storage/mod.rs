mod file_queue_storage;
mod memory_queue_storage;

pub use file_queue_storage::FileQueueStorage;
pub use memory_queue_storage::MemoryQueueStorage;
