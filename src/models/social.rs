// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Follow and block relationships.

use crate::models::cursor::{FeedCursor, Keyed};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A user in a follower/following/block list, keyed by when the
/// relationship was created.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RelationEntry {
    pub id: i64,
    pub name: String,
    pub profile_image: Option<String>,
    /// When the relationship was created
    pub since: DateTime<Utc>,
}

impl Keyed for RelationEntry {
    fn cursor_key(&self) -> FeedCursor {
        FeedCursor {
            created_at: self.since,
            id: self.id,
        }
    }
}
