// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance challenge and leaderboard tests.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

mod common;

use common::{access_token, create_test_app, get, post_json, seed_user, TestApp};

fn in_days(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339()
}

async fn log_run(app: &TestApp, token: &str, meters: f64, started_at: String) {
    let (status, body) = post_json(
        app,
        "/workouts",
        token,
        json!({
            "title": "Run",
            "sportType": "Run",
            "distanceMeters": meters,
            "durationSecs": 1800,
            "startedAt": started_at,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

async fn create_challenge(app: &TestApp, token: &str, goal: f64) -> Value {
    let (status, challenge) = post_json(
        app,
        "/challenges",
        token,
        json!({
            "title": "October 50K",
            "goalDistanceMeters": goal,
            "startsAt": in_days(-10),
            "endsAt": in_days(10),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{challenge}");
    challenge
}

#[tokio::test]
async fn test_leaderboard_ranks_and_completion() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let bob = seed_user(&app.state, "bob").await;
    let carol = seed_user(&app.state, "carol").await;
    let dave = seed_user(&app.state, "dave").await;
    let tokens: Vec<String> = [alice, bob, carol, dave]
        .iter()
        .map(|id| access_token(&app.state, *id))
        .collect();

    let challenge = create_challenge(&app, &tokens[0], 10_000.0).await;
    let id = challenge["id"].as_i64().unwrap();
    for token in &tokens {
        let (status, _) = post_json(&app, &format!("/challenges/{id}/join"), token, json!({})).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    log_run(&app, &tokens[0], 6_000.0, in_days(-2)).await;
    log_run(&app, &tokens[0], 6_000.0, in_days(-1)).await;
    log_run(&app, &tokens[1], 7_000.0, in_days(-1)).await;
    log_run(&app, &tokens[2], 7_000.0, in_days(-3)).await;
    // Outside the window.
    log_run(&app, &tokens[3], 50_000.0, in_days(-20)).await;

    let (status, board) = get(&app, &format!("/challenges/{id}/leaderboard"), None).await;
    assert_eq!(status, StatusCode::OK);
    let board = board.as_array().unwrap();
    assert_eq!(board.len(), 4);

    assert_eq!(board[0]["userId"], alice);
    assert_eq!(board[0]["rank"], 1);
    assert_eq!(board[0]["distanceMeters"], 12_000.0);
    assert_eq!(board[0]["completed"], true);

    assert_eq!(board[1]["rank"], 2);
    assert_eq!(board[2]["rank"], 2);
    assert_eq!(board[1]["completed"], false);

    assert_eq!(board[3]["userId"], dave);
    assert_eq!(board[3]["rank"], 4);
    assert_eq!(board[3]["distanceMeters"], 0.0);
}

#[tokio::test]
async fn test_join_rules() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    let challenge = create_challenge(&app, &token, 5_000.0).await;
    let join = format!("/challenges/{}/join", challenge["id"]);
    post_json(&app, &join, &token, json!({})).await;
    let (status, _) = post_json(&app, &join, &token, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, ended) = post_json(
        &app,
        "/challenges",
        &token,
        json!({
            "title": "September",
            "goalDistanceMeters": 1000.0,
            "startsAt": in_days(-40),
            "endsAt": in_days(-10),
        }),
    )
    .await;
    let (status, _) = post_json(&app, &format!("/challenges/{}/join", ended["id"]), &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&app, "/challenges/999/join", &token, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_challenge_validation() {
    let app = create_test_app().await;
    let alice = seed_user(&app.state, "alice").await;
    let token = access_token(&app.state, alice);

    let (status, body) = post_json(
        &app,
        "/challenges",
        &token,
        json!({
            "title": "Zero",
            "goalDistanceMeters": 0.0,
            "startsAt": in_days(-1),
            "endsAt": in_days(1),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = post_json(
        &app,
        "/challenges",
        &token,
        json!({
            "title": "Backwards",
            "goalDistanceMeters": 1000.0,
            "startsAt": in_days(1),
            "endsAt": in_days(-1),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, listing) = get(&app, "/challenges", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["items"].as_array().unwrap().len(), 0);
}
