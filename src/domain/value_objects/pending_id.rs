use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder returned by an offline `add`. The remote store assigns the
/// real key during replay, so this value never matches the record's
/// eventual id. A distinct type keeps callers from storing it where a
/// `RecordId` belongs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingId(String);

impl PendingId {
    pub fn generate() -> Self {
        Self(format!("pending-{}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_shape() {
        let id = PendingId::generate();
        assert!(id.as_str().starts_with("pending-"));
    }
}
