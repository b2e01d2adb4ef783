// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout routes.

use crate::error::Result;
use crate::middleware::auth::{AuthUser, MaybeUser};
use crate::models::workout::{FeedItem, TrackFormat, Workout};
use crate::services::workouts::{self, WorkoutDraft};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workouts", post(create_workout))
        .route("/workouts/{id}", get(get_workout).delete(delete_workout))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    title: String,
    #[validate(length(min = 1, max = 30))]
    sport_type: String,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    distance_meters: Option<f64>,
    #[validate(range(min = 0, message = "must not be negative"))]
    duration_secs: i64,
    started_at: DateTime<Utc>,
    route_polyline: Option<String>,
    file_key: Option<String>,
    file_format: Option<TrackFormat>,
}

async fn create_workout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<Workout>)> {
    body.validate()?;

    let draft = WorkoutDraft {
        title: body.title,
        sport_type: body.sport_type,
        distance_meters: body.distance_meters,
        duration_secs: body.duration_secs,
        started_at: body.started_at,
        route_polyline: body.route_polyline.filter(|p| !p.is_empty()),
        file_key: body.file_key.filter(|k| !k.is_empty()),
        file_format: body.file_format,
    };
    let workout = workouts::create_workout(&state, user.user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<FeedItem>> {
    Ok(Json(workouts::get_workout(&state, id, viewer.user_id()).await?))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    workouts::delete_workout(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
