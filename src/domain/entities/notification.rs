use crate::domain::entities::Record;
use crate::domain::value_objects::{RecordId, UserId};
use serde_json::Value;
use std::collections::BTreeMap;

/// Typed view of a notification record.
///
/// `seen_by` maps user id to `true`; absence means unseen. The map is
/// monotonically non-decreasing: once a user is marked, no code path
/// clears the entry short of deleting the record.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: RecordId,
    pub title: String,
    pub body: String,
    pub created_at: Option<i64>,
    pub seen_by: BTreeMap<String, bool>,
    /// Legacy scalar flag predating `seen_by`; mirrored on mark-seen so
    /// older records keep working.
    pub read: bool,
}

impl Notification {
    /// Lenient parse: records written by older app versions may lack any
    /// of these fields, so everything defaults rather than fails.
    pub fn from_record(record: &Record) -> Self {
        let title = record
            .field("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let body = record
            .field("body")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let created_at = record.field("createdAt").and_then(Value::as_i64);
        let read = record
            .field("read")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut seen_by = BTreeMap::new();
        if let Some(Value::Object(map)) = record.field("seenBy") {
            for (user, flag) in map {
                seen_by.insert(user.clone(), flag.as_bool().unwrap_or(false));
            }
        }

        Self {
            id: record.id.clone(),
            title,
            body,
            created_at,
            seen_by,
            read,
        }
    }

    pub fn seen(&self, user: &UserId) -> bool {
        self.seen_by.get(user.as_str()).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Snapshot;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Snapshot::from_value(Some(json!({"n1": value})))
            .unwrap()
            .records()[0]
            .clone()
    }

    #[test]
    fn test_parses_full_record() {
        let notification = Notification::from_record(&record(json!({
            "title": "Invoice overdue",
            "body": "Invoice #12 is 3 days overdue",
            "createdAt": 1700000000,
            "seenBy": {"alice": true},
            "read": true,
        })));

        assert_eq!(notification.title, "Invoice overdue");
        assert_eq!(notification.created_at, Some(1700000000));
        assert!(notification.seen(&UserId::new("alice").unwrap()));
        assert!(!notification.seen(&UserId::new("bob").unwrap()));
        assert!(notification.read);
    }

    #[test]
    fn test_missing_fields_default() {
        let notification = Notification::from_record(&record(json!({})));
        assert_eq!(notification.title, "");
        assert_eq!(notification.created_at, None);
        assert!(notification.seen_by.is_empty());
        assert!(!notification.read);
    }

    #[test]
    fn test_explicit_false_counts_as_unseen() {
        let notification =
            Notification::from_record(&record(json!({"seenBy": {"alice": false}})));
        assert!(!notification.seen(&UserId::new("alice").unwrap()));
    }
}
