// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post, comment and like routes.

use crate::error::Result;
use crate::middleware::auth::{AuthUser, MaybeUser};
use crate::models::cursor::{Page, PageQuery};
use crate::models::post::{CommentResponse, NewPost, PostResponse};
use crate::services::posts;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route(
            "/posts/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route("/posts/{id}/like", post(like).delete(unlike))
        .route("/comments/{id}", delete(delete_comment))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    content: String,
    #[validate(length(max = 1024))]
    image_url: Option<String>,
    workout_id: Option<i64>,
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    body.validate()?;

    let post = posts::create_post(
        &state,
        NewPost {
            author_id: user.user_id,
            content: body.content,
            image_url: body.image_url,
            workout_id: body.workout_id,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<PostResponse>>> {
    let page = query.into_request()?;
    Ok(Json(posts::list_posts(&state, viewer.user_id(), &page).await?))
}

async fn get_post(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<PostResponse>> {
    Ok(Json(posts::get_post(&state, id, viewer.user_id()).await?))
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    posts::delete_post(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Comments ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    content: String,
}

async fn create_comment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>)> {
    body.validate()?;
    let comment = posts::add_comment(&state, user.user_id, id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CommentResponse>>> {
    let page = query.into_request()?;
    Ok(Json(
        posts::list_comments(&state, id, viewer.user_id(), &page).await?,
    ))
}

async fn delete_comment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    posts::delete_comment(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Likes ───────────────────────────────────────────────────

async fn like(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    posts::like(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unlike(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    posts::unlike(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
