// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance challenges.

use crate::models::cursor::{FeedCursor, Keyed};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: i64,
    pub creator_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub goal_distance_meters: f64,
    pub starts_at: DateTime<Utc>,
    /// Exclusive upper bound of the challenge window
    pub ends_at: DateTime<Utc>,
    pub participant_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Challenge {
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at
    }
}

impl Keyed for Challenge {
    fn cursor_key(&self) -> FeedCursor {
        FeedCursor {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewChallenge {
    pub creator_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub goal_distance_meters: f64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Distance logged by a participant inside the challenge window.
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantProgress {
    pub user_id: i64,
    pub name: String,
    pub profile_image: Option<String>,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: i64,
    pub name: String,
    pub profile_image: Option<String>,
    pub distance_meters: f64,
    pub completed: bool,
}
