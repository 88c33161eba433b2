use crate::domain::value_objects::{QueueItemId, StorePath};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The mutation kinds the queue can hold, each with its own payload shape.
/// Replay matches on this exhaustively; there is no untyped fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum QueuedOp {
    /// Append a full record under a server-generated key. Path is the
    /// collection.
    Add { data: Value },
    /// Partial-field merge. Path is the full record path.
    Update { data: Map<String, Value> },
    /// Delete the record at the full record path.
    Remove,
}

impl QueuedOp {
    pub fn kind(&self) -> &'static str {
        match self {
            QueuedOp::Add { .. } => "add",
            QueuedOp::Update { .. } => "update",
            QueuedOp::Remove => "remove",
        }
    }
}

/// A pending write awaiting delivery to the remote store. Created when a
/// write fails while offline, persisted immediately, removed only after a
/// confirmed successful replay. Never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: QueueItemId,
    #[serde(flatten)]
    pub op: QueuedOp,
    pub path: StorePath,
    pub queued_at: DateTime<Utc>,
}

impl QueueItem {
    pub fn new(op: QueuedOp, path: StorePath) -> Self {
        Self {
            id: QueueItemId::generate(),
            op,
            path,
            queued_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_queue_item_serde_round_trip() {
        let item = QueueItem::new(
            QueuedOp::Add {
                data: json!({"title": "X"}),
            },
            StorePath::new("tasks").unwrap(),
        );

        let encoded = serde_json::to_string(&item).unwrap();
        let decoded: QueueItem = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn test_operation_tag_is_explicit() {
        let item = QueueItem::new(QueuedOp::Remove, StorePath::new("tasks/t1").unwrap());
        let encoded = serde_json::to_value(&item).unwrap();
        assert_eq!(encoded["operation"], "remove");
        assert_eq!(encoded["path"], "tasks/t1");
    }
}
