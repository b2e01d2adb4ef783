// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout recording and route distance.

use crate::error::AppError;
use crate::models::workout::{FeedItem, NewWorkout, TrackFormat, Workout};
use crate::services::storage::StorageKey;
use crate::AppState;
use chrono::{DateTime, Utc};
use geo::{Haversine, Length, LineString};

/// Requested workout, before distance resolution.
#[derive(Debug, Clone)]
pub struct WorkoutDraft {
    pub title: String,
    pub sport_type: String,
    pub distance_meters: Option<f64>,
    pub duration_secs: i64,
    pub started_at: DateTime<Utc>,
    pub route_polyline: Option<String>,
    pub file_key: Option<String>,
    pub file_format: Option<TrackFormat>,
}

/// Figures extracted from a track file.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub distance_meters: f64,
}

/// Length in meters of an encoded polyline (precision 5).
pub fn polyline_distance(encoded: &str) -> Result<f64, AppError> {
    let line: LineString<f64> = polyline::decode_polyline(encoded, 5)
        .map_err(|e| AppError::BadRequest(format!("Invalid route polyline: {}", e)))?;
    Ok(Haversine.length(&line))
}

/// Summarize an uploaded track file.
///
/// Track parsing is not supported yet; every format fails fast.
pub fn summarize_track(format: TrackFormat, _bytes: &[u8]) -> Result<TrackSummary, AppError> {
    Err(AppError::NotImplemented(format!(
        "{} track summarization",
        format.as_str().to_uppercase()
    )))
}

/// Create a workout for `user_id`, resolving its distance from the explicit
/// value, the route polyline, or the attached track file, in that order.
pub async fn create_workout(
    state: &AppState,
    user_id: i64,
    draft: WorkoutDraft,
) -> Result<Workout, AppError> {
    let file_key = draft
        .file_key
        .as_deref()
        .map(StorageKey::parse)
        .transpose()?;
    if let Some(key) = &file_key {
        if !key.as_str().starts_with(&format!("{user_id}/")) {
            return Err(AppError::Forbidden("Track file belongs to another user".to_string()));
        }
    }

    let distance_meters = match (&draft.distance_meters, &draft.route_polyline, &file_key) {
        (Some(d), _, _) => *d,
        (None, Some(encoded), _) => polyline_distance(encoded)?,
        (None, None, Some(key)) => {
            let format = draft.file_format.ok_or_else(|| {
                AppError::BadRequest("fileFormat is required with fileKey".to_string())
            })?;
            let bytes = state
                .storage
                .get(key)
                .await?
                .ok_or_else(|| AppError::NotFound("Track file not found".to_string()))?;
            summarize_track(format, &bytes)?.distance_meters
        }
        (None, None, None) => {
            return Err(AppError::BadRequest(
                "One of distanceMeters, routePolyline or fileKey is required".to_string(),
            ))
        }
    };

    let workout = state
        .db
        .insert_workout(&NewWorkout {
            user_id,
            title: draft.title,
            sport_type: draft.sport_type,
            distance_meters,
            duration_secs: draft.duration_secs,
            started_at: draft.started_at,
            route_polyline: draft.route_polyline,
            file_key: file_key.map(|k| k.as_str().to_string()),
            file_format: draft.file_format,
        })
        .await?;

    tracing::info!(user_id, workout_id = workout.id, distance_meters, "Workout recorded");
    Ok(workout)
}

pub async fn get_workout(
    state: &AppState,
    workout_id: i64,
    viewer: Option<i64>,
) -> Result<FeedItem, AppError> {
    state
        .db
        .get_workout(workout_id, viewer)
        .await?
        .map(FeedItem::from)
        .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))
}

/// Delete a workout; only its owner may.
pub async fn delete_workout(state: &AppState, user_id: i64, workout_id: i64) -> Result<(), AppError> {
    match state.db.workout_owner(workout_id).await? {
        None => Err(AppError::NotFound("Workout not found".to_string())),
        Some(owner) if owner != user_id => {
            Err(AppError::Forbidden("Not your workout".to_string()))
        }
        Some(_) => {
            state.db.delete_workout(workout_id, user_id).await?;
            Ok(())
        }
    }
}
