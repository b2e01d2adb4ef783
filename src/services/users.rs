// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profiles and account lifecycle.

use crate::error::AppError;
use crate::models::cursor::{Page, PageRequest};
use crate::models::post::PostResponse;
use crate::models::user::{ProfileResponse, ProfileUpdate, User};
use crate::models::workout::FeedItem;
use crate::AppState;

/// Load a user that `viewer` is allowed to see.
///
/// Missing, deleted and block-related users are all reported as not found.
pub async fn visible_user(
    state: &AppState,
    user_id: i64,
    viewer: Option<i64>,
) -> Result<User, AppError> {
    let not_found = || AppError::NotFound("User not found".to_string());

    let user = state.db.get_active_user(user_id).await?.ok_or_else(not_found)?;

    if let Some(viewer) = viewer.filter(|v| *v != user_id) {
        if state.db.is_blocked_either_way(viewer, user_id).await? {
            return Err(not_found());
        }
    }

    Ok(user)
}

pub async fn my_profile(state: &AppState, user_id: i64) -> Result<ProfileResponse, AppError> {
    let user = visible_user(state, user_id, None).await?;
    Ok(ProfileResponse::from_user(user, true, None))
}

pub async fn profile(
    state: &AppState,
    user_id: i64,
    viewer: Option<i64>,
) -> Result<ProfileResponse, AppError> {
    let user = visible_user(state, user_id, viewer).await?;

    let is_self = viewer == Some(user_id);
    let is_following = match viewer {
        Some(v) if !is_self => Some(state.db.is_following(v, user_id).await?),
        _ => None,
    };

    Ok(ProfileResponse::from_user(user, is_self, is_following))
}

pub async fn update_profile(
    state: &AppState,
    user_id: i64,
    update: ProfileUpdate,
) -> Result<ProfileResponse, AppError> {
    let user = state.db.update_profile(user_id, &update).await?;
    Ok(ProfileResponse::from_user(user, true, None))
}

/// Soft-delete the caller's account. Outstanding tokens stop working
/// immediately because every request re-checks the user.
pub async fn delete_account(state: &AppState, user_id: i64) -> Result<(), AppError> {
    if !state.db.soft_delete_user(user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    tracing::info!(user_id, "User account soft-deleted");

    state.notifications.close_streams(user_id);
    state.conversations.close_streams(user_id);
    Ok(())
}

pub async fn user_workouts(
    state: &AppState,
    user_id: i64,
    viewer: Option<i64>,
    page: &PageRequest,
) -> Result<Page<FeedItem>, AppError> {
    visible_user(state, user_id, viewer).await?;
    let rows = state.db.list_user_workouts(user_id, page).await?;
    Ok(Page::from_rows(rows, page).map(FeedItem::from))
}

pub async fn user_posts(
    state: &AppState,
    user_id: i64,
    viewer: Option<i64>,
    page: &PageRequest,
) -> Result<Page<PostResponse>, AppError> {
    visible_user(state, user_id, viewer).await?;
    let rows = state.db.list_user_posts(user_id, page).await?;
    Ok(Page::from_rows(rows, page).map(PostResponse::from))
}
