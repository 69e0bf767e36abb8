// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{create_challenge, create_test_app, send, signup};

#[tokio::test]
async fn test_signup_rejects_bad_email() {
    let (app, _) = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "not-an-email", "password": "hunter22", "name": "X" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_signup_rejects_short_password() {
    let (app, _) = create_test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "short@example.com", "password": "abc", "name": "X" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_query_too_long() {
    let (app, _) = create_test_app();
    let (_, token) = signup(&app, "searcher@example.com").await;

    let long_query = "a".repeat(101);
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/challenges?q={}", long_query),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_challenge_requires_title() {
    let (app, _) = create_test_app();
    let (_, token) = signup(&app, "titleless@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/challenges",
        Some(&token),
        Some(json!({ "title": "", "description": "Something" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_completion_invalid_date_format() {
    let (app, _) = create_test_app();
    let (_, token) = signup(&app, "dates@example.com").await;
    let challenge_id = create_challenge(&app, &token, "Yoga").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/completions",
        Some(&token),
        Some(json!({ "challengeId": challenge_id, "photo": "p", "date": "03/10/2024" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].as_str().unwrap().contains("YYYY-MM-DD"));
}

#[tokio::test]
async fn test_completion_requires_photo() {
    let (app, _) = create_test_app();
    let (_, token) = signup(&app, "nophoto@example.com").await;
    let challenge_id = create_challenge(&app, &token, "Cook").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/completions",
        Some(&token),
        Some(json!({ "challengeId": challenge_id, "photo": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calendar_invalid_month() {
    let (app, _) = create_test_app();
    let (user_id, token) = signup(&app, "months@example.com").await;

    for month in ["2024-13", "2024", "March"] {
        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/completions/{}/calendar?month={}", user_id, month),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "month {}", month);
    }
}

#[tokio::test]
async fn test_dashboard_rejects_distant_today() {
    let (app, _) = create_test_app();
    let (_, token) = signup(&app, "timetravel@example.com").await;

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/dashboard?today=2000-01-01",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_rejects_unknown_theme() {
    let (app, _) = create_test_app();
    let (user_id, token) = signup(&app, "neon@example.com").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/users/{}", user_id),
        Some(&token),
        Some(json!({ "theme": "neon-orange" })),
    )
    .await;

    // Rejected by the JSON extractor before reaching the handler
    assert!(status.is_client_error());
}
