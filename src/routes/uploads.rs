// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw file uploads.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::StorageKey;
use crate::AppState;
use axum::{
    body::{to_bytes, Body},
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/uploads/{*key}", get(download).put(upload))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub key: String,
    pub size: usize,
}

/// `PUT /uploads/{*key}`: store the raw body under `{user_id}/{key}`.
async fn upload(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<UploadResponse>> {
    let limit = state.config.max_upload_bytes;
    let too_large = || AppError::PayloadTooLarge { limit };

    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(too_large());
    }

    let key = StorageKey::for_owner(user.user_id, &key)?;
    let bytes = to_bytes(body, limit).await.map_err(|_| too_large())?;

    state.storage.put(&key, &bytes).await?;
    tracing::info!(user_id = user.user_id, key = key.as_str(), size = bytes.len(), "Upload stored");

    Ok(Json(UploadResponse {
        key: key.as_str().to_string(),
        size: bytes.len(),
    }))
}

/// `GET /uploads/{*key}`: return the stored bytes.
async fn download(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse> {
    let key = StorageKey::parse(&key)?;
    let bytes = state
        .storage
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("Upload not found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, key.content_type())], bytes))
}
