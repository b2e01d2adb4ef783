// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Crew and crew board routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::crew::{BoardPostResponse, Crew, CrewMember};
use crate::models::cursor::{Page, PageQuery};
use crate::services::crews;
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
        .route("/crews", get(list_crews).post(create_crew))
        .route("/crews/{id}", get(get_crew))
        .route("/crews/{id}/members", get(list_members))
        .route("/crews/{id}/join", post(join_crew))
        .route("/crews/{id}/leave", post(leave_crew))
        .route("/crews/{id}/board", get(list_board).post(create_board_post))
        .route("/crews/{id}/board/{post_id}", delete(delete_board_post))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCrewRequest {
    #[validate(length(min = 2, max = 50, message = "must be 2-50 characters"))]
    name: String,
    #[validate(length(max = 500))]
    description: Option<String>,
}

async fn create_crew(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<CreateCrewRequest>,
) -> Result<(StatusCode, Json<Crew>)> {
    body.validate()?;
    let crew = crews::create_crew(
        &state,
        user.user_id,
        body.name.trim(),
        body.description.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(crew)))
}

async fn list_crews(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Crew>>> {
    let page = query.into_request()?;
    Ok(Json(crews::list_crews(&state, &page).await?))
}

async fn get_crew(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<Json<Crew>> {
    Ok(Json(crews::get_crew(&state, id).await?))
}

async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CrewMember>>> {
    Ok(Json(crews::members(&state, id).await?))
}

async fn join_crew(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    crews::join(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn leave_crew(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    crews::leave(&state, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Board ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardPostRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    title: String,
    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    content: String,
}

async fn list_board(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<BoardPostResponse>>> {
    let page = query.into_request()?;
    Ok(Json(crews::board(&state, id, &page).await?))
}

async fn create_board_post(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<CreateBoardPostRequest>,
) -> Result<(StatusCode, Json<BoardPostResponse>)> {
    body.validate()?;
    let post = crews::add_board_post(&state, user.user_id, id, &body.title, &body.content).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn delete_board_post(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((id, post_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    crews::delete_board_post(&state, user.user_id, id, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
