// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use habitflow::error::AppError;

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
        (AppError::InvalidCredentials, StatusCode::BAD_REQUEST),
        (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
        (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        (AppError::Conflict("x".into()), StatusCode::CONFLICT),
        (
            AppError::Database("x".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::Internal(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, expected) in cases {
        let label = err.to_string();
        assert_eq!(err.into_response().status(), expected, "{}", label);
    }
}

#[tokio::test]
async fn test_database_details_not_leaked() {
    let response = AppError::Database("connection string secret".into()).into_response();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(body.contains("database_error"));
    assert!(!body.contains("secret"));
}
