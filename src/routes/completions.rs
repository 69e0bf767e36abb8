// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completion recording and history routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CompletionRecord, UserProfile};
use crate::routes::users::load_own_user;
use crate::services::ledger::completed_days_in_month;
use crate::time_utils::{days_between, parse_day, parse_month, today_utc, MAX_CLIENT_DAY_SKEW};
use crate::AppState;

/// Photos arrive as data URLs; cap them well below the body limit.
const MAX_PHOTO_LEN: u64 = 10 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/completions", post(record_completion))
        .route("/api/completions/{user_id}", get(get_user_completions))
        .route(
            "/api/completions/{user_id}/calendar",
            get(get_completion_calendar),
        )
        .route(
            "/api/completions/challenge/{challenge_id}",
            get(get_challenge_completions),
        )
}

/// All completions of the caller, newest first.
async fn get_user_completions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<CompletionRecord>>> {
    auth.require_self(&user_id)?;
    let completions = state.db.get_completions_for_user(&user_id).await?;
    Ok(Json(completions))
}

/// All completions of a challenge, newest first.
async fn get_challenge_completions(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<String>,
) -> Result<Json<Vec<CompletionRecord>>> {
    if state.db.get_challenge(&challenge_id).await?.is_none() {
        return Err(AppError::NotFound("Challenge not found".to_string()));
    }
    let completions = state.db.get_completions_for_challenge(&challenge_id).await?;
    Ok(Json(completions))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordCompletionRequest {
    #[validate(length(min = 1, max = 200))]
    pub challenge_id: String,
    #[validate(length(min = 1, max = MAX_PHOTO_LEN))]
    pub photo: String,
    /// `YYYY-MM-DD`; defaults to today (UTC), at most one day ahead of it
    pub date: Option<String>,
}

/// A stored completion plus the caller's updated profile.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecordCompletionResponse {
    pub completion: CompletionRecord,
    pub user: UserProfile,
}

/// Record today's (or a past day's) completion and credit points.
async fn record_completion(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<RecordCompletionRequest>,
) -> Result<(StatusCode, Json<RecordCompletionResponse>)> {
    body.validate()?;

    let today = today_utc();
    let date = match body.date.as_deref() {
        Some(raw) => parse_day(raw).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid date '{}': expected YYYY-MM-DD", raw))
        })?,
        None => today,
    };
    // Clients ahead of UTC may already be on the next calendar day
    if days_between(today, date) > MAX_CLIENT_DAY_SKEW {
        return Err(AppError::BadRequest(
            "Cannot record a completion for a future day".to_string(),
        ));
    }

    let user = load_own_user(&state, &auth, &auth.user_id).await?;
    if state.db.get_challenge(&body.challenge_id).await?.is_none() {
        return Err(AppError::NotFound("Challenge not found".to_string()));
    }
    if !user.challenges.contains(&body.challenge_id) {
        return Err(AppError::Forbidden(
            "Join the challenge before recording completions".to_string(),
        ));
    }

    let completion = CompletionRecord {
        user_id: user.id.clone(),
        challenge_id: body.challenge_id,
        date,
        photo: body.photo,
        recorded_at: Utc::now(),
    };

    let points = state.config.points_per_completion;
    state.db.record_completion(&completion, points).await?;

    tracing::info!(
        user_id = %completion.user_id,
        challenge_id = %completion.challenge_id,
        date = %completion.date,
        points,
        "Completion recorded"
    );

    let user = load_own_user(&state, &auth, &auth.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordCompletionResponse {
            completion,
            user: user.profile(),
        }),
    ))
}

#[derive(Deserialize)]
struct CalendarQuery {
    /// `YYYY-MM`; defaults to the current month (UTC)
    month: Option<String>,
}

/// Days of one month with at least one completion.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarResponse {
    pub month: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "Array<string>"))]
    pub completed_days: Vec<NaiveDate>,
}

async fn get_completion_calendar(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>> {
    auth.require_self(&user_id)?;

    let month = params
        .month
        .unwrap_or_else(|| today_utc().format("%Y-%m").to_string());
    let (year, month_number) = parse_month(&month).ok_or_else(|| {
        AppError::BadRequest(format!("Invalid month '{}': expected YYYY-MM", month))
    })?;

    let completions = state.db.get_completions_for_user(&user_id).await?;
    let completed_days = completed_days_in_month(&completions, year, month_number);

    Ok(Json(CalendarResponse {
        month: format!("{:04}-{:02}", year, month_number),
        completed_days,
    }))
}
