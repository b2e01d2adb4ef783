// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-app notifications.

use crate::models::cursor::{FeedCursor, Keyed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum NotificationKind {
    Follow,
    Like,
    Comment,
    CrewJoin,
    EventRegistration,
    Message,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub actor_id: Option<i64>,
    pub kind: NotificationKind,
    /// Kind-specific references (post id, crew id, ...)
    pub payload: Json<serde_json::Value>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

impl Keyed for Notification {
    fn cursor_key(&self) -> FeedCursor {
        FeedCursor {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

/// Values for inserting a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: i64,
    pub actor_id: Option<i64>,
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread: i64,
}
