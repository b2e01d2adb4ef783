// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile, follow and block routes.

use crate::error::Result;
use crate::middleware::auth::{AuthUser, MaybeUser};
use crate::models::cursor::{Page, PageQuery};
use crate::models::post::PostResponse;
use crate::models::user::{ProfileResponse, ProfileUpdate};
use crate::models::{FeedItem, RelationEntry};
use crate::services::{social, users};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Routes open to anonymous callers.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/{id}", get(get_profile))
        .route("/users/{id}/workouts", get(get_user_workouts))
        .route("/users/{id}/posts", get(get_user_posts))
        .route("/users/{id}/followers", get(get_followers))
        .route("/users/{id}/following", get(get_following))
}

/// Routes that require a session. The auth layer is applied in routes/mod.rs.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/me", get(get_me).patch(update_me).delete(delete_me))
        .route("/users/me/blocks", get(get_blocks))
        .route("/users/{id}/follow", post(follow).delete(unfollow))
        .route("/users/{id}/block", post(block).delete(unblock))
}

// ─── Own Profile ─────────────────────────────────────────────

async fn get_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>> {
    Ok(Json(users::my_profile(&state, user.user_id).await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    name: Option<String>,
    #[validate(length(max = 300, message = "must be at most 300 characters"))]
    bio: Option<String>,
    #[validate(length(max = 1024))]
    profile_image: Option<String>,
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    body.validate()?;

    let update = ProfileUpdate {
        name: body.name.map(|n| n.trim().to_string()),
        bio: body.bio,
        profile_image: body.profile_image,
    };
    Ok(Json(users::update_profile(&state, user.user_id, update).await?))
}

async fn delete_me(State(state): State<Arc<AppState>>, user: AuthUser) -> Result<StatusCode> {
    tracing::info!(user_id = user.user_id, "User-initiated account deletion");
    users::delete_account(&state, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_blocks(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<RelationEntry>>> {
    let page = query.into_request()?;
    Ok(Json(social::blocked_users(&state, user.user_id, &page).await?))
}

// ─── Other Profiles ──────────────────────────────────────────

async fn get_profile(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<ProfileResponse>> {
    Ok(Json(users::profile(&state, id, viewer.user_id()).await?))
}

async fn get_user_workouts(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<FeedItem>>> {
    let page = query.into_request()?;
    Ok(Json(
        users::user_workouts(&state, id, viewer.user_id(), &page).await?,
    ))
}

async fn get_user_posts(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<PostResponse>>> {
    let page = query.into_request()?;
    Ok(Json(users::user_posts(&state, id, viewer.user_id(), &page).await?))
}

async fn get_followers(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<RelationEntry>>> {
    let page = query.into_request()?;
    Ok(Json(social::followers(&state, id, viewer.user_id(), &page).await?))
}

async fn get_following(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<RelationEntry>>> {
    let page = query.into_request()?;
    Ok(Json(social::following(&state, id, viewer.user_id(), &page).await?))
}

// ─── Follow / Block ──────────────────────────────────────────

async fn follow(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    social::follow(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unfollow(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    social::unfollow(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn block(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    social::block(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unblock(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    social::unblock(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
