// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password authentication routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::normalize_email;
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::{ChallengeMembership, Theme, User, UserProfile};
use crate::services::password::{hash_password, verify_password};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Successful signup/login response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

/// Build the session cookie carrying `token`.
fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let frontend = &state.config.frontend_url;
    let secure =
        !(frontend.starts_with("http://localhost") || frontend.starts_with("http://127.0.0.1"));

    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(i64::from(state.config.token_ttl_days)))
        .build()
}

fn issue_session(state: &AppState, jar: CookieJar, user: &User) -> Result<(CookieJar, String)> {
    let token = create_jwt(
        &user.id,
        &user.email,
        &state.config.jwt_signing_key,
        state.config.token_ttl_days,
    )?;
    let jar = jar.add(session_cookie(state, token.clone()));
    Ok((jar, token))
}

/// Register a new account and start a session.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    body.validate()?;

    let password_hash = hash_password(&body.password)?;
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: normalize_email(&body.email),
        password_hash,
        name: body.name.trim().to_string(),
        points: 0,
        challenges: ChallengeMembership::new(),
        theme: Theme::default(),
        profile_picture: None,
        created_at: Utc::now(),
    };

    state.db.create_user(&user).await?;
    tracing::info!(user_id = %user.id, "New user signed up");

    let (jar, token) = issue_session(&state, jar, &user)?;
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: user.profile(),
            token,
        }),
    ))
}

/// Verify credentials and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    body.validate()?;

    let user = state
        .db
        .find_user_by_email(&body.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash) {
        tracing::warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(user_id = %user.id, "User logged in");
    let (jar, token) = issue_session(&state, jar, &user)?;
    Ok((
        jar,
        Json(AuthResponse {
            user: user.profile(),
            token,
        }),
    ))
}

/// End the session by clearing the cookie. Bearer tokens simply expire.
async fn logout(jar: CookieJar) -> (StatusCode, CookieJar) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (StatusCode::NO_CONTENT, jar)
}
