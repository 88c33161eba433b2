mod memory_remote_store;

pub use memory_remote_store::MemoryRemoteStore;
