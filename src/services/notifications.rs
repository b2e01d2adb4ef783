// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification persistence and live delivery.
//!
//! Notifications are stored first and then pushed to the recipient's open
//! SSE connections as `event: notification`. Clients that were offline
//! catch up through the listing endpoint.

use crate::db::Database;
use crate::error::AppError;
use crate::models::cursor::{Page, PageRequest};
use crate::models::notification::{NewNotification, Notification, NotificationKind};
use crate::services::sse::{PushEvent, SseRegistry, Subscription};
use std::sync::Arc;

pub const NOTIFICATION_EVENT: &str = "notification";

#[derive(Clone)]
pub struct NotificationService {
    db: Database,
    registry: Arc<SseRegistry>,
}

impl NotificationService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            registry: SseRegistry::new(),
        }
    }

    /// Store and push a notification.
    ///
    /// Failures are logged and swallowed: a notification must never fail the
    /// action that triggered it. Self-notifications are skipped. `Message`
    /// notifications are stored but not pushed; the conversation stream
    /// already carries them.
    pub async fn notify(
        &self,
        recipient_id: i64,
        actor_id: i64,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) {
        if recipient_id == actor_id {
            return;
        }

        let new = NewNotification {
            recipient_id,
            actor_id: Some(actor_id),
            kind,
            payload,
        };

        let notification = match self.db.insert_notification(&new).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, recipient_id, ?kind, "Failed to store notification");
                return;
            }
        };

        if kind == NotificationKind::Message {
            return;
        }

        match serde_json::to_value(&notification) {
            Ok(data) => {
                let delivered = self
                    .registry
                    .publish(recipient_id, PushEvent::new(NOTIFICATION_EVENT, data));
                tracing::debug!(recipient_id, ?kind, delivered, "Notification pushed");
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize notification"),
        }
    }

    pub async fn list(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> Result<Page<Notification>, AppError> {
        let rows = self.db.list_notifications(user_id, page).await?;
        Ok(Page::from_rows(rows, page))
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<i64, AppError> {
        self.db.unread_notification_count(user_id).await
    }

    /// Mark one of the caller's notifications read.
    pub async fn mark_read(
        &self,
        user_id: i64,
        notification_id: i64,
    ) -> Result<Notification, AppError> {
        self.db
            .mark_notification_read(notification_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }

    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64, AppError> {
        self.db.mark_all_notifications_read(user_id).await
    }

    /// End every live stream `user_id` holds.
    pub fn close_streams(&self, user_id: i64) -> usize {
        self.registry.disconnect_user(user_id)
    }

    /// Open a live notification stream for `user_id`.
    pub fn subscribe(&self, user_id: i64) -> Subscription {
        self.registry.connect(user_id)
    }
}
