// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::challenge::{Challenge, LeaderboardEntry, NewChallenge};
use crate::models::cursor::{Page, PageQuery};
use crate::services::challenges;
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
        .route("/challenges", get(list_challenges).post(create_challenge))
        .route("/challenges/{id}", get(get_challenge))
        .route("/challenges/{id}/join", post(join_challenge))
        .route("/challenges/{id}/leaderboard", get(leaderboard))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    title: String,
    #[validate(length(max = 2000))]
    description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "must be positive"))]
    goal_distance_meters: f64,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

async fn create_challenge(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<CreateChallengeRequest>,
) -> Result<(StatusCode, Json<Challenge>)> {
    body.validate()?;

    let challenge = challenges::create_challenge(
        &state,
        NewChallenge {
            creator_id: user.user_id,
            title: body.title,
            description: body.description,
            goal_distance_meters: body.goal_distance_meters,
            starts_at: body.starts_at,
            ends_at: body.ends_at,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(challenge)))
}

async fn list_challenges(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Challenge>>> {
    let page = query.into_request()?;
    Ok(Json(challenges::list_challenges(&state, &page).await?))
}

async fn get_challenge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Challenge>> {
    Ok(Json(challenges::get_challenge(&state, id).await?))
}

async fn join_challenge(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    challenges::join(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    Ok(Json(challenges::leaderboard(&state, id).await?))
}
