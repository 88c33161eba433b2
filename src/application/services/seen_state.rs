use crate::application::services::data_access::{
    DataAccessFacade, DataSubscription, SnapshotHandler, WriteOutcome,
};
use crate::domain::entities::{Notification, Snapshot};
use crate::domain::value_objects::{RecordId, StorePath, UserId};
use crate::shared::error::AppError;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Per-user view over the notification collection: which notifications the
/// attached user has not acknowledged, and mutations that stay safe when
/// several users acknowledge concurrently.
///
/// Marking seen patches the nested `seenBy/<user>` key rather than
/// rewriting the whole map, so another user's concurrent acknowledgement
/// is never clobbered and the map only ever grows.
pub struct SeenStateService {
    data: Arc<DataAccessFacade>,
    path: StorePath,
    user: UserId,
    state: Mutex<FeedState>,
}

#[derive(Default)]
struct FeedState {
    /// Current snapshot, newest-first.
    notifications: Vec<Notification>,
    /// Ids seen in the previous snapshot, for new-arrival detection.
    known_ids: HashSet<String>,
    /// One-shot "has new notifications" signal; the UI clears it.
    has_new: bool,
}

impl SeenStateService {
    pub fn new(data: Arc<DataAccessFacade>, path: StorePath, user: UserId) -> Self {
        Self {
            data,
            path,
            user,
            state: Mutex::new(FeedState::default()),
        }
    }

    /// Subscribes this service to its notification collection. Returns the
    /// subscription handle; the caller owns cancellation.
    pub async fn attach(self: &Arc<Self>) -> Result<DataSubscription, AppError> {
        let service = self.clone();
        let handler: SnapshotHandler = Arc::new(move |snapshot| {
            service.apply_snapshot(&snapshot);
        });
        let errors: crate::application::services::data_access::ErrorHandler =
            Arc::new(|e| warn!("Notification snapshot dropped: {}", e));
        self.data.fetch_data(&self.path, handler, Some(errors)).await
    }

    /// Ingests one push: parse, sort newest-first (stable, so records with
    /// equal or missing timestamps keep their snapshot order), then diff
    /// against the previous ids to raise the new-notification flag.
    pub fn apply_snapshot(&self, snapshot: &Snapshot) {
        let mut notifications: Vec<Notification> = snapshot
            .records()
            .iter()
            .map(Notification::from_record)
            .collect();
        notifications.sort_by(|a, b| {
            b.created_at
                .unwrap_or(i64::MIN)
                .cmp(&a.created_at.unwrap_or(i64::MIN))
        });

        let mut state = self.state.lock().expect("feed state lock");
        let attention = notifications.iter().any(|notification| {
            !state.known_ids.contains(notification.id.as_str()) || !notification.seen(&self.user)
        });
        if attention {
            state.has_new = true;
        }
        state.known_ids = notifications
            .iter()
            .map(|notification| notification.id.to_string())
            .collect();
        state.notifications = notifications;
    }

    /// Acknowledges one notification for the attached user and mirrors the
    /// legacy scalar `read` flag for records predating `seenBy`.
    pub async fn mark_seen(&self, id: &RecordId) -> Result<WriteOutcome, AppError> {
        let mut partial = Map::new();
        partial.insert(
            format!("seenBy/{}", self.user),
            Value::Bool(true),
        );
        partial.insert("read".to_string(), Value::Bool(true));
        self.data.update_data(&self.path, id, partial).await
    }

    /// Acknowledges every currently-unseen notification, one update per
    /// record rather than a batch. Returns how many updates were issued.
    pub async fn mark_all_seen(&self) -> Result<usize, AppError> {
        let unseen: Vec<RecordId> = {
            let state = self.state.lock().expect("feed state lock");
            state
                .notifications
                .iter()
                .filter(|notification| !notification.seen(&self.user))
                .map(|notification| notification.id.clone())
                .collect()
        };
        for id in &unseen {
            self.mark_seen(id).await?;
        }
        Ok(unseen.len())
    }

    /// Derived, never stored: notifications whose `seenBy` lacks a `true`
    /// entry for the attached user.
    pub fn unseen_count(&self) -> usize {
        let state = self.state.lock().expect("feed state lock");
        state
            .notifications
            .iter()
            .filter(|notification| !notification.seen(&self.user))
            .count()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.lock().expect("feed state lock").notifications.clone()
    }

    pub fn has_new(&self) -> bool {
        self.state.lock().expect("feed state lock").has_new
    }

    pub fn clear_new_flag(&self) {
        self.state.lock().expect("feed state lock").has_new = false;
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }
}
