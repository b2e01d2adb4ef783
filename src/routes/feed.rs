// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Home feed route.

use crate::error::Result;
use crate::middleware::auth::MaybeUser;
use crate::models::cursor::{Page, PageQuery};
use crate::models::FeedItem;
use crate::services::feed;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/feed", get(get_feed))
}

/// `GET /feed?cursor=&limit=`
async fn get_feed(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<FeedItem>>> {
    let page = query.into_request()?;
    Ok(Json(feed::feed_page(&state, viewer.user_id(), &page).await?))
}
