// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upload and track file tests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use runcrew::config::Config;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

use common::{access_token, create_test_app, create_test_app_with, post_json, seed_user, TestApp};

async fn put_upload(app: &TestApp, key: &str, token: Option<&str>, bytes: Vec<u8>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(Method::PUT)
        .uri(format!("/uploads/{key}"));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let response = app
        .router
        .clone()
        .oneshot(builder.body(Body::from(bytes)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_upload_round_trip_is_namespaced() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    let (status, body) = put_upload(&app, "photos/day1.png", Some(&token), b"png-bytes".to_vec()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], format!("{alice}/photos/day1.png"));
    assert_eq!(body["size"], 9);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/uploads/{alice}/photos/day1.png"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"png-bytes");
}

#[tokio::test]
async fn test_upload_requires_auth() {
    let app = create_test_app().await;

    let (status, _) = put_upload(&app, "a.png", None, b"x".to_vec()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_rejects_bad_keys() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    for key in ["a/../b.png", "sp%20ace.png", "./x"] {
        let (status, _) = put_upload(&app, key, Some(&token), b"x".to_vec()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{key}");
    }
}

#[tokio::test]
async fn test_upload_too_large() {
    let mut config = Config::test_default();
    config.max_upload_bytes = 16;
    let app = create_test_app_with(config).await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    let (status, body) = put_upload(&app, "big.gpx", Some(&token), vec![b'x'; 17]).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "payload_too_large");

    let (status, _) = put_upload(&app, "small.gpx", Some(&token), vec![b'x'; 16]).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_upload_is_not_found() {
    let app = create_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/uploads/1/nothing.gpx")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_workout_distance_from_polyline() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    let (status, body) = post_json(
        &app,
        "/workouts",
        &token,
        json!({
            "title": "Route run",
            "sportType": "Run",
            "durationSecs": 3600,
            "startedAt": "2026-03-01T07:00:00Z",
            "routePolyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let distance = body["distanceMeters"].as_f64().unwrap();
    assert!(distance > 700_000.0 && distance < 800_000.0, "{distance}");
}

#[tokio::test]
async fn test_workout_track_file_summary_not_implemented() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    put_upload(&app, "track.gpx", Some(&token), b"<gpx/>".to_vec()).await;

    let (status, body) = post_json(
        &app,
        "/workouts",
        &token,
        json!({
            "title": "Track run",
            "sportType": "Run",
            "durationSecs": 3600,
            "startedAt": "2026-03-01T07:00:00Z",
            "fileKey": format!("{alice}/track.gpx"),
            "fileFormat": "gpx",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"], "not_implemented");
}

#[tokio::test]
async fn test_workout_requires_some_distance_source() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    let (status, _) = post_json(
        &app,
        "/workouts",
        &token,
        json!({
            "title": "Mystery run",
            "sportType": "Run",
            "durationSecs": 3600,
            "startedAt": "2026-03-01T07:00:00Z",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_workout_rejects_other_users_file() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let bob = seed_user(&app.state, "bob").await;
    let token = access_token(&app.state, alice);

    let (status, _) = post_json(
        &app,
        "/workouts",
        &token,
        json!({
            "title": "Borrowed run",
            "sportType": "Run",
            "durationSecs": 3600,
            "startedAt": "2026-03-01T07:00:00Z",
            "fileKey": format!("{bob}/track.fit"),
            "fileFormat": "fit",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
