// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feed pagination tests.
//!
//! These tests verify that:
//! 1. Pages split a sequence exactly, ending with a null cursor
//! 2. `limit` is clamped into [1, 50]
//! 3. Rows inserted between page fetches never shift later pages
//! 4. Malformed cursors are rejected

use axum::http::StatusCode;
use chrono::Utc;
use runcrew::models::workout::NewWorkout;
use runcrew::AppState;
use serde_json::Value;

mod common;

use common::{create_test_app, get, seed_user, TestApp};

async fn insert_workouts(state: &AppState, user_id: i64, count: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let workout = state
            .db
            .insert_workout(&NewWorkout {
                user_id,
                title: format!("Run {i}"),
                sport_type: "Run".to_string(),
                distance_meters: 1000.0 * (i + 1) as f64,
                duration_secs: 600,
                started_at: Utc::now(),
                route_polyline: None,
                file_key: None,
                file_format: None,
            })
            .await
            .unwrap();
        ids.push(workout.id);
    }
    ids
}

fn item_ids(body: &Value) -> Vec<i64> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

async fn fetch_page(app: &TestApp, limit: i64, cursor: Option<&str>) -> (Vec<i64>, Option<String>) {
    let uri = match cursor {
        Some(c) => format!("/feed?limit={limit}&cursor={c}"),
        None => format!("/feed?limit={limit}"),
    };
    let (status, body) = get(app, &uri, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let next = body["nextCursor"].as_str().map(str::to_string);
    (item_ids(&body), next)
}

#[tokio::test]
async fn test_twelve_items_in_pages_of_five() {
    let app = create_test_app().await;
    let user = seed_user(&app.state, "alice").await;
    let mut ids = insert_workouts(&app.state, user, 12).await;
    ids.reverse();

    let (first, cursor) = fetch_page(&app, 5, None).await;
    assert_eq!(first, ids[0..5]);
    let cursor = cursor.expect("first page has a cursor");

    let (second, cursor) = fetch_page(&app, 5, Some(&cursor)).await;
    assert_eq!(second, ids[5..10]);
    let cursor = cursor.expect("second page has a cursor");

    let (third, cursor) = fetch_page(&app, 5, Some(&cursor)).await;
    assert_eq!(third, ids[10..12]);
    assert_eq!(cursor, None);
}

#[tokio::test]
async fn test_exact_multiple_ends_with_null_cursor() {
    let app = create_test_app().await;
    let user = seed_user(&app.state, "alice").await;
    insert_workouts(&app.state, user, 5).await;

    let (items, cursor) = fetch_page(&app, 5, None).await;
    assert_eq!(items.len(), 5);
    assert_eq!(cursor, None);
}

#[tokio::test]
async fn test_limit_is_clamped() {
    let app = create_test_app().await;
    let user = seed_user(&app.state, "alice").await;
    insert_workouts(&app.state, user, 55).await;

    let (items, _) = fetch_page(&app, 0, None).await;
    assert_eq!(items.len(), 1);

    let (items, _) = fetch_page(&app, -3, None).await;
    assert_eq!(items.len(), 1);

    let (items, _) = fetch_page(&app, 500, None).await;
    assert_eq!(items.len(), 50);

    let (items, _) = fetch_page(&app, 17, None).await;
    assert_eq!(items.len(), 17);

    let (status, body) = get(&app, "/feed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_concurrent_inserts_do_not_shift_pages() {
    let app = create_test_app().await;
    let user = seed_user(&app.state, "alice").await;
    let mut snapshot = insert_workouts(&app.state, user, 12).await;
    snapshot.reverse();

    let mut seen = Vec::new();
    let (page, mut cursor) = fetch_page(&app, 5, None).await;
    seen.extend(page);

    while let Some(c) = cursor {
        // New rows land ahead of the cursor
        insert_workouts(&app.state, user, 2).await;
        let (page, next) = fetch_page(&app, 5, Some(&c)).await;
        seen.extend(page);
        cursor = next;
    }

    assert_eq!(seen, snapshot);
}

#[tokio::test]
async fn test_malformed_cursor_rejected() {
    let app = create_test_app().await;

    for cursor in ["not-base64!", "Zm9v", "MTox"] {
        let (status, body) = get(&app, &format!("/feed?cursor={cursor}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "cursor {cursor}");
        assert_eq!(body["error"], "bad_request");
    }
}
