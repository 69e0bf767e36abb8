// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile, progress reset and points reconciliation.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Theme, User, UserProfile};
use crate::services::points::consolidate_points;
use crate::AppState;

/// Profile pictures arrive as data URLs; cap them well below the body limit.
const MAX_PROFILE_PICTURE_LEN: u64 = 5 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/{id}", get(get_user).put(update_user))
        .route("/api/users/{id}/reset", post(reset_progress))
        .route("/api/users/{id}/reconcile", post(reconcile_points))
}

/// Load a user the caller is allowed to see.
pub(crate) async fn load_own_user(state: &AppState, auth: &AuthUser, user_id: &str) -> Result<User> {
    auth.require_self(user_id)?;
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

/// Get a user profile.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>> {
    let user = load_own_user(&state, &auth, &user_id).await?;
    Ok(Json(user.profile()))
}

/// Profile fields a user may change. Omitted fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub theme: Option<Theme>,
    #[validate(length(max = MAX_PROFILE_PICTURE_LEN))]
    pub profile_picture: Option<String>,
}

/// Update name, theme or profile picture. The points balance is never
/// written here.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>> {
    body.validate()?;
    let mut user = load_own_user(&state, &auth, &user_id).await?;

    if let Some(name) = body.name {
        user.name = name.trim().to_string();
    }
    if let Some(theme) = body.theme {
        user.theme = theme;
    }
    if let Some(picture) = body.profile_picture {
        user.profile_picture = (!picture.is_empty()).then_some(picture);
    }

    state.db.update_user(&user).await?;
    tracing::info!(user_id = %user.id, theme = ?user.theme, "Profile updated");

    Ok(Json(user.profile()))
}

/// Zero points, leave every challenge and delete all completions.
async fn reset_progress(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>> {
    auth.require_self(&user_id)?;

    let user = state
        .db
        .reset_user_progress(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    tracing::info!(user_id = %user_id, "User-initiated progress reset");
    Ok(Json(user.profile()))
}

/// Result of a points reconciliation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReconcileResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub previous_points: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
    pub total_completions: u32,
}

/// Rewrite the stored balance from the completion history.
async fn reconcile_points(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ReconcileResponse>> {
    let user = load_own_user(&state, &auth, &user_id).await?;
    let completions = state.db.get_completions_for_user(&user_id).await?;

    let previous_points = user.points;
    let points = consolidate_points(&completions, state.config.points_per_completion);

    if previous_points != points {
        state.db.set_points(&user_id, points).await?;
        tracing::info!(
            user_id = %user_id,
            previous_points,
            points,
            "Points balance reconciled"
        );
    }

    Ok(Json(ReconcileResponse {
        previous_points,
        points,
        total_completions: completions.len() as u32,
    }))
}
