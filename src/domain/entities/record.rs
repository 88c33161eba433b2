use crate::domain::value_objects::RecordId;
use serde_json::{Map, Value};

/// One child of a collection snapshot, materialized with its storage key.
///
/// Invariant relied on by every consumer: `id` equals the storage key and
/// is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Flattens back into the `{id, ...fields}` object shape consumers see.
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("id".to_string(), Value::String(self.id.to_string()));
        Value::Object(map)
    }
}

/// What a subscription push delivers after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// No value at the subscribed path. Empty, not an error.
    Empty,
    /// A keyed object, normalized to `{id: key, ...value}` entries.
    Records(Vec<Record>),
    /// Any non-object value, passed through unchanged.
    Raw(Value),
}

impl Snapshot {
    /// Normalizes a raw push. A keyed object becomes `Records`; children
    /// that are not objects themselves are kept as a single field named
    /// `value` so no data is dropped.
    pub fn from_value(value: Option<Value>) -> Result<Self, String> {
        let value = match value {
            None | Some(Value::Null) => return Ok(Snapshot::Empty),
            Some(value) => value,
        };

        let object = match value {
            Value::Object(object) => object,
            other => return Ok(Snapshot::Raw(other)),
        };

        let mut records = Vec::with_capacity(object.len());
        for (key, child) in object {
            let id = RecordId::new(key)?;
            let fields = match child {
                Value::Object(fields) => fields,
                other => {
                    let mut fields = Map::new();
                    fields.insert("value".to_string(), other);
                    fields
                }
            };
            records.push(Record { id, fields });
        }
        Ok(Snapshot::Records(records))
    }

    pub fn records(&self) -> &[Record] {
        match self {
            Snapshot::Records(records) => records,
            _ => &[],
        }
    }
}
