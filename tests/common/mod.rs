// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use runcrew::config::Config;
use runcrew::db::Database;
use runcrew::middleware::auth::{create_token, TokenType};
use runcrew::models::user::NewUser;
use runcrew::routes::create_router;
use runcrew::services::DiskStorage;
use runcrew::AppState;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Router plus the state and upload directory backing it.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    // Kept alive for the duration of the test
    #[allow(dead_code)]
    pub upload_dir: TempDir,
}

/// Create a test app backed by an in-memory database and a temporary
/// upload directory.
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    create_test_app_with(Config::test_default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with(config: Config) -> TestApp {
    let db = Database::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    let upload_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = Arc::new(DiskStorage::new(upload_dir.path()));

    let state = Arc::new(AppState::new(config, db, storage));
    TestApp {
        router: create_router(state.clone()),
        state,
        upload_dir,
    }
}

/// Insert a user and return its id.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, name: &str) -> i64 {
    state
        .db
        .find_or_create_user(&NewUser {
            provider: "google".to_string(),
            provider_account_id: format!("acct-{name}"),
            email: Some(format!("{name}@example.com")),
            name: name.to_string(),
            profile_image: None,
        })
        .await
        .expect("Failed to seed user")
        .id
}

/// Access token for `user_id` signed with the app's key.
#[allow(dead_code)]
pub fn access_token(state: &AppState, user_id: i64) -> String {
    create_token(
        user_id,
        None,
        TokenType::Access,
        3600,
        &state.config.jwt_secret,
    )
    .expect("Failed to create token")
}

/// Send a request and return the status and parsed JSON body
/// (`Value::Null` for empty or non-JSON bodies).
#[allow(dead_code)]
pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[allow(dead_code)]
pub async fn get(app: &TestApp, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, token, None).await
}

#[allow(dead_code)]
pub async fn post_json(app: &TestApp, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

/// Record a workout with an explicit distance; returns its id.
#[allow(dead_code)]
pub async fn create_workout(app: &TestApp, token: &str, title: &str) -> i64 {
    let (status, body) = post_json(
        app,
        "/workouts",
        token,
        serde_json::json!({
            "title": title,
            "sportType": "Run",
            "distanceMeters": 5000.0,
            "durationSecs": 1500,
            "startedAt": "2026-03-01T07:00:00Z",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}
