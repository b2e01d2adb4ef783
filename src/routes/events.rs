// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event and registration routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::cursor::clamp_limit;
use crate::models::event::{Event, NewEvent, Participant, Registration};
use crate::services::events;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
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
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/register", post(register))
        .route("/events/{id}/cancel", post(cancel))
        .route("/events/{id}/participants", get(list_participants))
        .route(
            "/events/{id}/participants/{user_id}/complete",
            post(complete),
        )
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    title: String,
    #[validate(length(max = 2000))]
    description: Option<String>,
    #[validate(length(max = 200))]
    location: Option<String>,
    starts_at: DateTime<Utc>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    capacity: Option<i64>,
    crew_id: Option<i64>,
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    body.validate()?;

    let event = events::create_event(
        &state,
        NewEvent {
            organizer_id: user.user_id,
            crew_id: body.crew_id,
            title: body.title,
            description: body.description,
            location: body.location,
            starts_at: body.starts_at,
            capacity: body.capacity,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    crew_id: Option<i64>,
    limit: Option<i64>,
}

/// `GET /events?crewId=&limit=`: upcoming events, soonest first.
async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<Event>>> {
    Ok(Json(
        events::upcoming(&state, query.crew_id, clamp_limit(query.limit)).await?,
    ))
}

async fn get_event(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<Json<Event>> {
    Ok(Json(events::get_event(&state, id).await?))
}

async fn register(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<Registration>)> {
    let registration = events::register(&state, user.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

async fn cancel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Registration>> {
    Ok(Json(events::cancel(&state, user.user_id, id).await?))
}

async fn complete(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((id, participant_id)): Path<(i64, i64)>,
) -> Result<Json<Registration>> {
    Ok(Json(
        events::complete(&state, user.user_id, id, participant_id).await?,
    ))
}

async fn list_participants(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Participant>>> {
    Ok(Json(events::participants(&state, id).await?))
}
