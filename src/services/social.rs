// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Follow and block rules.

use crate::error::AppError;
use crate::models::cursor::{Page, PageRequest};
use crate::models::notification::NotificationKind;
use crate::models::social::RelationEntry;
use crate::services::users::visible_user;
use crate::AppState;
use serde_json::json;

pub async fn follow(state: &AppState, follower_id: i64, target_id: i64) -> Result<(), AppError> {
    if follower_id == target_id {
        return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
    }
    if state.db.get_active_user(target_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    if state.db.is_blocked_either_way(follower_id, target_id).await? {
        return Err(AppError::Forbidden("User is blocked".to_string()));
    }

    if !state.db.follow(follower_id, target_id).await? {
        return Err(AppError::Conflict("Already following".to_string()));
    }

    tracing::info!(follower_id, target_id, "Followed user");
    state
        .notifications
        .notify(
            target_id,
            follower_id,
            NotificationKind::Follow,
            json!({ "userId": follower_id }),
        )
        .await;
    Ok(())
}

pub async fn unfollow(state: &AppState, follower_id: i64, target_id: i64) -> Result<(), AppError> {
    if !state.db.unfollow(follower_id, target_id).await? {
        return Err(AppError::NotFound("Not following".to_string()));
    }
    Ok(())
}

/// Block a user. Repeating a block is a no-op.
pub async fn block(state: &AppState, blocker_id: i64, target_id: i64) -> Result<(), AppError> {
    if blocker_id == target_id {
        return Err(AppError::BadRequest("Cannot block yourself".to_string()));
    }
    if state.db.get_user(target_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    state.db.block(blocker_id, target_id).await?;
    tracing::info!(blocker_id, target_id, "Blocked user");
    Ok(())
}

pub async fn unblock(state: &AppState, blocker_id: i64, target_id: i64) -> Result<(), AppError> {
    state.db.unblock(blocker_id, target_id).await
}

pub async fn followers(
    state: &AppState,
    user_id: i64,
    viewer: Option<i64>,
    page: &PageRequest,
) -> Result<Page<RelationEntry>, AppError> {
    visible_user(state, user_id, viewer).await?;
    let rows = state.db.list_followers(user_id, page).await?;
    Ok(Page::from_rows(rows, page))
}

pub async fn following(
    state: &AppState,
    user_id: i64,
    viewer: Option<i64>,
    page: &PageRequest,
) -> Result<Page<RelationEntry>, AppError> {
    visible_user(state, user_id, viewer).await?;
    let rows = state.db.list_following(user_id, page).await?;
    Ok(Page::from_rows(rows, page))
}

pub async fn blocked_users(
    state: &AppState,
    user_id: i64,
    page: &PageRequest,
) -> Result<Page<RelationEntry>, AppError> {
    let rows = state.db.list_blocked(user_id, page).await?;
    Ok(Page::from_rows(rows, page))
}
