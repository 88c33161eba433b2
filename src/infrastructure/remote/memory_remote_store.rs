use crate::application::ports::remote_store::{RemoteStore, SubscriptionId, ValueHandler};
use crate::domain::value_objects::{RecordId, StorePath};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Mutex;

/// In-memory remote store over one JSON tree. Backs local runs and the
/// test suite; the production backend implements the same port.
///
/// Subscribers get the value at their path on subscribe and after every
/// mutation that touches their subtree, synchronously in the mutating
/// call. `set_available(false)` makes every operation fail with a
/// network error, standing in for a disconnected backend.
pub struct MemoryRemoteStore {
    state: Mutex<StoreState>,
}

struct StoreState {
    root: Value,
    subscriptions: Vec<Subscription>,
    next_subscription: u64,
    next_push: u64,
    available: bool,
}

struct Subscription {
    id: SubscriptionId,
    path: StorePath,
    handler: ValueHandler,
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                root: Value::Object(Map::new()),
                subscriptions: Vec::new(),
                next_subscription: 0,
                next_push: 0,
                available: true,
            }),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().expect("store lock").available = available;
    }

    /// Applies `mutate` and fans the changed subtree out to subscribers.
    /// Handlers run after the lock is released.
    fn mutate<T>(
        &self,
        touched: &StorePath,
        mutate: impl FnOnce(&mut StoreState) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let (result, notifications) = {
            let mut state = self.state.lock().expect("store lock");
            if !state.available {
                return Err(AppError::Network(format!(
                    "remote store unavailable, cannot reach {touched}"
                )));
            }
            let result = mutate(&mut state)?;
            let notifications = state.notifications_for(touched);
            (result, notifications)
        };
        for (handler, value) in notifications {
            handler(value);
        }
        Ok(result)
    }
}

impl StoreState {
    fn notifications_for(&self, touched: &StorePath) -> Vec<(ValueHandler, Option<Value>)> {
        self.subscriptions
            .iter()
            .filter(|sub| sub.path.contains(touched) || touched.contains(&sub.path))
            .map(|sub| (sub.handler.clone(), value_at(&self.root, &sub.path)))
            .collect()
    }
}

fn value_at(root: &Value, path: &StorePath) -> Option<Value> {
    let mut current = root;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    match current {
        // Empty nodes do not exist, matching realtime-store semantics;
        // this is what lets the one-time seed detect a fresh database.
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.clone()),
    }
}

fn set_at(root: &mut Value, path: &StorePath, value: Value) {
    if path.is_root() {
        *root = value;
        return;
    }
    let segments: Vec<&str> = path.segments().collect();
    let mut current = root;
    for segment in &segments[..segments.len() - 1] {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = current
            .as_object_mut()
            .expect("just coerced to object")
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    current
        .as_object_mut()
        .expect("just coerced to object")
        .insert(segments[segments.len() - 1].to_string(), value);
}

fn remove_at(root: &mut Value, path: &StorePath) {
    if path.is_root() {
        *root = Value::Object(Map::new());
        return;
    }
    let segments: Vec<&str> = path.segments().collect();
    let mut current = root;
    for segment in &segments[..segments.len() - 1] {
        match current.as_object_mut().and_then(|map| map.get_mut(*segment)) {
            Some(child) => current = child,
            None => return,
        }
    }
    if let Some(map) = current.as_object_mut() {
        map.remove(segments[segments.len() - 1]);
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn subscribe(
        &self,
        path: &StorePath,
        on_value: ValueHandler,
    ) -> Result<SubscriptionId, AppError> {
        let (initial, id) = {
            let mut state = self.state.lock().expect("store lock");
            if !state.available {
                return Err(AppError::Network(format!(
                    "remote store unavailable, cannot subscribe to {path}"
                )));
            }
            state.next_subscription += 1;
            let id = SubscriptionId(state.next_subscription);
            state.subscriptions.push(Subscription {
                id,
                path: path.clone(),
                handler: on_value.clone(),
            });
            (value_at(&state.root, path), id)
        };
        on_value(initial);
        Ok(id)
    }

    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), AppError> {
        let mut state = self.state.lock().expect("store lock");
        if !state.available {
            return Err(AppError::Network(
                "remote store unavailable, cannot unsubscribe".to_string(),
            ));
        }
        state.subscriptions.retain(|sub| sub.id != id);
        Ok(())
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), AppError> {
        self.mutate(path, |state| {
            set_at(&mut state.root, path, value);
            Ok(())
        })
    }

    async fn push_append(&self, path: &StorePath, value: Value) -> Result<RecordId, AppError> {
        self.mutate(path, |state| {
            state.next_push += 1;
            let key = format!("r{}-{:04}", Utc::now().timestamp_millis(), state.next_push);
            let child = path
                .join(&key)
                .map_err(AppError::InvalidInput)?;
            set_at(&mut state.root, &child, value);
            RecordId::new(key).map_err(AppError::Internal)
        })
    }

    async fn patch(&self, path: &StorePath, partial: Map<String, Value>) -> Result<(), AppError> {
        self.mutate(path, |state| {
            for (key, value) in partial {
                // Slash-separated keys address nested fields, so patches
                // of sibling nested keys merge instead of clobbering.
                let mut target = path.clone();
                for segment in key.split('/') {
                    target = target.join(segment).map_err(AppError::InvalidInput)?;
                }
                set_at(&mut state.root, &target, value);
            }
            Ok(())
        })
    }

    async fn delete(&self, path: &StorePath) -> Result<(), AppError> {
        self.mutate(path, |state| {
            remove_at(&mut state.root, path);
            Ok(())
        })
    }

    async fn read_once(&self, path: &StorePath) -> Result<Option<Value>, AppError> {
        let state = self.state.lock().expect("store lock");
        if !state.available {
            return Err(AppError::Network(format!(
                "remote store unavailable, cannot read {path}"
            )));
        }
        Ok(value_at(&state.root, path))
    }
}
