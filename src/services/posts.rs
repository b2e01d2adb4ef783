// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Posts, comments and likes.

use crate::error::AppError;
use crate::models::cursor::{Page, PageRequest};
use crate::models::notification::NotificationKind;
use crate::models::post::{CommentResponse, NewPost, PostResponse, PostWithAuthor};
use crate::AppState;
use serde_json::json;

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

async fn visible_post(
    state: &AppState,
    post_id: i64,
    viewer: Option<i64>,
) -> Result<PostWithAuthor, AppError> {
    state
        .db
        .get_post(post_id, viewer)
        .await?
        .ok_or_else(post_not_found)
}

pub async fn create_post(state: &AppState, post: NewPost) -> Result<PostResponse, AppError> {
    if let Some(workout_id) = post.workout_id {
        match state.db.workout_owner(workout_id).await? {
            Some(owner) if owner == post.author_id => {}
            Some(_) => {
                return Err(AppError::Forbidden(
                    "Workout belongs to another user".to_string(),
                ))
            }
            None => return Err(AppError::NotFound("Workout not found".to_string())),
        }
    }

    let author_id = post.author_id;
    let created = state.db.insert_post(&post).await?;
    tracing::info!(user_id = author_id, post_id = created.id, "Post created");

    visible_post(state, created.id, Some(author_id))
        .await
        .map(PostResponse::from)
}

pub async fn get_post(
    state: &AppState,
    post_id: i64,
    viewer: Option<i64>,
) -> Result<PostResponse, AppError> {
    visible_post(state, post_id, viewer).await.map(PostResponse::from)
}

pub async fn list_posts(
    state: &AppState,
    viewer: Option<i64>,
    page: &PageRequest,
) -> Result<Page<PostResponse>, AppError> {
    let rows = state.db.list_posts(viewer, page).await?;
    Ok(Page::from_rows(rows, page).map(PostResponse::from))
}

pub async fn delete_post(state: &AppState, user_id: i64, post_id: i64) -> Result<(), AppError> {
    let post = visible_post(state, post_id, Some(user_id)).await?;
    if post.post.author_id != user_id {
        return Err(AppError::Forbidden("Not the author of this post".to_string()));
    }

    state.db.delete_post(post_id).await?;
    tracing::info!(user_id, post_id, "Post deleted");
    Ok(())
}

// ─── Comments ────────────────────────────────────────────────

pub async fn add_comment(
    state: &AppState,
    user_id: i64,
    post_id: i64,
    content: &str,
) -> Result<CommentResponse, AppError> {
    let post = visible_post(state, post_id, Some(user_id)).await?;

    let comment = state.db.insert_comment(post_id, user_id, content).await?;

    state
        .notifications
        .notify(
            post.post.author_id,
            user_id,
            NotificationKind::Comment,
            json!({ "postId": post_id, "commentId": comment.id }),
        )
        .await;

    let author = state
        .db
        .get_active_user(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author: (&author).into(),
        content: comment.content,
        created_at: comment.created_at,
    })
}

pub async fn list_comments(
    state: &AppState,
    post_id: i64,
    viewer: Option<i64>,
    page: &PageRequest,
) -> Result<Page<CommentResponse>, AppError> {
    visible_post(state, post_id, viewer).await?;
    let rows = state.db.list_comments(post_id, viewer, page).await?;
    Ok(Page::from_rows(rows, page).map(CommentResponse::from))
}

/// Delete a comment. Allowed for the comment's author and the post's author.
pub async fn delete_comment(
    state: &AppState,
    user_id: i64,
    comment_id: i64,
) -> Result<(), AppError> {
    let comment = state
        .db
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    let post_author = state
        .db
        .get_post(comment.post_id, None)
        .await?
        .map(|p| p.post.author_id);

    if comment.author_id != user_id && post_author != Some(user_id) {
        return Err(AppError::Forbidden(
            "Not allowed to delete this comment".to_string(),
        ));
    }

    state.db.delete_comment(&comment).await
}

// ─── Likes ───────────────────────────────────────────────────

pub async fn like(state: &AppState, user_id: i64, post_id: i64) -> Result<(), AppError> {
    let post = visible_post(state, post_id, Some(user_id)).await?;

    if !state.db.like_post(post_id, user_id).await? {
        return Err(AppError::Conflict("Already liked".to_string()));
    }

    state
        .notifications
        .notify(
            post.post.author_id,
            user_id,
            NotificationKind::Like,
            json!({ "postId": post_id }),
        )
        .await;
    Ok(())
}

pub async fn unlike(state: &AppState, user_id: i64, post_id: i64) -> Result<(), AppError> {
    if !state.db.unlike_post(post_id, user_id).await? {
        return Err(AppError::NotFound("Like not found".to_string()));
    }
    Ok(())
}
