// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Home feed.

use crate::error::AppError;
use crate::models::cursor::{Page, PageRequest};
use crate::models::workout::FeedItem;
use crate::AppState;

/// One page of the global workout feed as seen by `viewer`.
///
/// Authors in a block relationship with the viewer (either direction) are
/// left out; anonymous viewers see everything.
pub async fn feed_page(
    state: &AppState,
    viewer: Option<i64>,
    page: &PageRequest,
) -> Result<Page<FeedItem>, AppError> {
    let rows = state.db.feed_workouts(viewer, page).await?;
    Ok(Page::from_rows(rows, page).map(FeedItem::from))
}
