// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use habitflow::config::Config;
use habitflow::db::{FirestoreDb, MemoryDb};
use habitflow::middleware::auth::create_jwt;
use habitflow::routes::create_router;
use habitflow::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by an empty in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: Arc::new(MemoryDb::new()),
    });

    (create_router(state.clone()), state)
}

/// Create a session token for `user_id` signed with `signing_key`.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, "test@example.com", signing_key, 1).unwrap()
}

/// Send a request and decode the JSON response body (`Null` when empty).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Sign up a fresh account. Returns `(user_id, token)`.
#[allow(dead_code)]
pub async fn signup(app: &axum::Router, email: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "hunter22",
            "name": "Test User",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);

    let user_id = body["user"]["id"].as_str().unwrap().to_string();
    let token = body["token"].as_str().unwrap().to_string();
    (user_id, token)
}

/// Create a challenge as the token's user (who joins it). Returns its ID.
#[allow(dead_code)]
pub async fn create_challenge(app: &axum::Router, token: &str, title: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/challenges",
        Some(token),
        Some(serde_json::json!({
            "title": title,
            "description": "Do the thing every day",
            "category": "Health",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}
