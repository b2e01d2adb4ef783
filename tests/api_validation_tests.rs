// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::{access_token, create_test_app, get, post_json, seed_user, send};

#[tokio::test]
async fn test_profile_name_too_long() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(&token),
        Some(json!({ "name": "a".repeat(51) })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"]["name"].is_array());
}

#[tokio::test]
async fn test_profile_update_applies() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(&token),
        Some(json!({ "name": "Alice R.", "bio": "Marathoner" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["name"], "Alice R.");

    let (_, me) = get(&app, "/users/me", Some(&token)).await;
    assert_eq!(me["bio"], "Marathoner");
}

#[tokio::test]
async fn test_invalid_date_format() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    let (status, _) = post_json(
        &app,
        "/workouts",
        &token,
        json!({
            "title": "Run",
            "sportType": "Run",
            "distanceMeters": 5000.0,
            "durationSecs": 1500,
            "startedAt": "yesterday",
        }),
    )
    .await;

    assert!(status.is_client_error(), "{status}");
}

#[tokio::test]
async fn test_malformed_json_body() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/posts")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_path_id() {
    let app = create_test_app().await;

    let (status, _) = get(&app, "/posts/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
