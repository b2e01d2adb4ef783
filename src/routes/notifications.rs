// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification routes, including the live SSE stream.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::cursor::{Page, PageQuery};
use crate::models::notification::{Notification, UnreadCount};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;

/// All notification routes require a session; the auth layer is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/stream", get(stream))
        .route("/notifications/{id}/read", post(mark_read))
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Notification>>> {
    let page = query.into_request()?;
    Ok(Json(state.notifications.list(user.user_id, &page).await?))
}

async fn unread_count(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<UnreadCount>> {
    let unread = state.notifications.unread_count(user.user_id).await?;
    Ok(Json(UnreadCount { unread }))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Notification>> {
    Ok(Json(state.notifications.mark_read(user.user_id, id).await?))
}

async fn mark_all_read(State(state): State<Arc<AppState>>, user: AuthUser) -> Result<StatusCode> {
    let updated = state.notifications.mark_all_read(user.user_id).await?;
    tracing::debug!(user_id = user.user_id, updated, "Marked all notifications read");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /notifications/stream`: `event: notification` for each new notification.
async fn stream(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let subscription = state.notifications.subscribe(user.user_id);
    Sse::new(subscription.into_stream()).keep_alive(KeepAlive::default())
}
