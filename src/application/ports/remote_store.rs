use crate::domain::value_objects::{RecordId, StorePath};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Push handler for one subscription. Receives the current value at the
/// path immediately on subscribe and again on every change; `None` means
/// the path has no value. Invocations for one subscription never overlap.
pub type ValueHandler = Arc<dyn Fn(Option<Value>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The keyed, hierarchical realtime backend this core reads from and
/// writes to. Consumed, never implemented here for production; the
/// in-memory implementation backs local runs and tests.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn subscribe(
        &self,
        path: &StorePath,
        on_value: ValueHandler,
    ) -> Result<SubscriptionId, AppError>;

    /// Idempotent; unknown or already-removed ids are a no-op.
    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), AppError>;

    /// Set the exact value at `path`, replacing whatever was there.
    async fn write(&self, path: &StorePath, value: Value) -> Result<(), AppError>;

    /// Append under a store-generated key and return that key.
    async fn push_append(&self, path: &StorePath, value: Value) -> Result<RecordId, AppError>;

    /// Partial-field merge at `path`. Keys may contain `/` to address
    /// nested fields, so concurrent patches of different nested keys do
    /// not clobber each other.
    async fn patch(&self, path: &StorePath, partial: Map<String, Value>) -> Result<(), AppError>;

    async fn delete(&self, path: &StorePath) -> Result<(), AppError>;

    async fn read_once(&self, path: &StorePath) -> Result<Option<Value>, AppError>;
}
