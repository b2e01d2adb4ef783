// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Public routes treat bad credentials as anonymous
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use runcrew::middleware::auth::{create_token, TokenType};
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::{access_token, create_test_app, get, seed_user, send};

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = create_test_app().await;

    let (status, body) = get(&app, "/users/me", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let app = create_test_app().await;

    let (status, body) = get(&app, "/users/me", Some("invalid.token.here")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_protected_route_with_malformed_header() {
    let app = create_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/notifications/unread-count")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let app = create_test_app().await;
    let user_id = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, user_id);

    let (status, body) = get(&app, "/users/me", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id);
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn test_token_for_unknown_user_rejected() {
    let app = create_test_app().await;
    let token = access_token(&app.state, 999);

    let (status, _) = get(&app, "/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_not_accepted_as_access() {
    let app = create_test_app().await;
    let user_id = seed_user(&app.state, "alice").await;
    let refresh = create_token(
        user_id,
        None,
        TokenType::Refresh,
        3600,
        &app.state.config.jwt_secret,
    )
    .unwrap();

    let (status, _) = get(&app, "/users/me", Some(&refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_route_swallows_bad_token() {
    let app = create_test_app().await;

    let (anonymous, body) = get(&app, "/feed", None).await;
    assert_eq!(anonymous, StatusCode::OK);
    assert_eq!(body["items"], json!([]));

    let (with_bad_token, body) = get(&app, "/feed", Some("invalid.token.here")).await;
    assert_eq!(with_bad_token, StatusCode::OK);
    assert_eq!(body["nextCursor"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_mixed_route_write_requires_auth() {
    let app = create_test_app().await;

    let (status, _) = send(
        &app,
        axum::http::Method::POST,
        "/posts",
        None,
        Some(json!({ "content": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/posts", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let app = create_test_app().await;
    let user_id = seed_user(&app.state, "alice").await;
    let refresh = create_token(
        user_id,
        None,
        TokenType::Refresh,
        3600,
        &app.state.config.jwt_secret,
    )
    .unwrap();

    let (status, body) = send(
        &app,
        axum::http::Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let access = body["accessToken"].as_str().unwrap();
    assert!(body["refreshToken"].as_str().is_some());

    let (status, _) = get(&app, "/users/me", Some(access)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = create_test_app().await;
    let user_id = seed_user(&app.state, "alice").await;
    let access = access_token(&app.state, user_id);

    let (status, _) = send(
        &app,
        axum::http::Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": access })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = create_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/users/me")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app().await;

    let (status, body) = get(&app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["buildId"].is_string());
}
