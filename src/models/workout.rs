// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout model for storage and API.

use crate::models::cursor::{FeedCursor, Keyed};
use crate::models::user::{AuthorColumns, UserSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored workout record.
#[derive(Debug, Clone, Serialize, FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: i64,
    /// Owner
    pub user_id: i64,
    pub title: String,
    /// Sport type (Run, Ride, Walk, Hike, ...)
    pub sport_type: String,
    /// Distance in meters
    pub distance_meters: f64,
    pub duration_secs: i64,
    /// When the workout itself happened
    pub started_at: DateTime<Utc>,
    /// Encoded route polyline (precision 5)
    pub route_polyline: Option<String>,
    /// Storage key of the uploaded track file
    pub file_key: Option<String>,
    pub file_format: Option<String>,
    /// When the workout was recorded on the server (feed ordering key)
    pub created_at: DateTime<Utc>,
}

impl Keyed for Workout {
    fn cursor_key(&self) -> FeedCursor {
        FeedCursor {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

/// Track file formats accepted on workouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackFormat {
    Gpx,
    Fit,
}

impl TrackFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackFormat::Gpx => "gpx",
            TrackFormat::Fit => "fit",
        }
    }
}

/// Values for inserting a workout.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub user_id: i64,
    pub title: String,
    pub sport_type: String,
    pub distance_meters: f64,
    pub duration_secs: i64,
    pub started_at: DateTime<Utc>,
    pub route_polyline: Option<String>,
    pub file_key: Option<String>,
    pub file_format: Option<TrackFormat>,
}

/// Workout joined with its author, as shown in the feed and profile pages.
#[derive(Debug, Clone, FromRow)]
pub struct WorkoutWithAuthor {
    #[sqlx(flatten)]
    pub workout: Workout,
    #[sqlx(flatten)]
    pub author: AuthorColumns,
}

impl Keyed for WorkoutWithAuthor {
    fn cursor_key(&self) -> FeedCursor {
        self.workout.cursor_key()
    }
}

/// Feed item response.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(flatten)]
    pub workout: Workout,
    pub author: UserSummary,
}

impl From<WorkoutWithAuthor> for FeedItem {
    fn from(row: WorkoutWithAuthor) -> Self {
        let author = row.author.into_summary(row.workout.user_id);
        Self {
            workout: row.workout,
            author,
        }
    }
}
