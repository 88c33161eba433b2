use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Locally generated token for a queued operation: enqueue time in
/// milliseconds plus a random suffix. Used only for local dedup and
/// removal; never sent to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueItemId(String);

impl QueueItemId {
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple();
        Self(format!("{millis}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
