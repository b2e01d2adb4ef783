// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Direct message routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::conversation::ConversationResponse;
use crate::models::cursor::{Page, PageQuery};
use crate::models::Message;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures_util::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use validator::Validate;

/// All conversation routes require a session; the auth layer is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/conversations",
            get(list_conversations).post(open_conversation),
        )
        .route("/conversations/stream", get(stream))
        .route(
            "/conversations/{id}/messages",
            get(list_messages).post(send_message),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenConversationRequest {
    user_id: i64,
}

async fn open_conversation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<OpenConversationRequest>,
) -> Result<Json<ConversationResponse>> {
    Ok(Json(
        state.conversations.open(user.user_id, body.user_id).await?,
    ))
}

async fn list_conversations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<ConversationResponse>>> {
    Ok(Json(state.conversations.list(user.user_id).await?))
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Message>>> {
    let page = query.into_request()?;
    Ok(Json(
        state.conversations.messages(user.user_id, id, &page).await?,
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 1000, message = "must be 1-1000 characters"))]
    body: String,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    body.validate()?;
    let message = state.conversations.send(user.user_id, id, &body.body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /conversations/stream`: `event: message` for every message in the
/// caller's conversations, including the caller's own.
async fn stream(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let subscription = state.conversations.subscribe(user.user_id);
    Sse::new(subscription.into_stream()).keep_alive(KeepAlive::default())
}
