// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statistics and dashboard routes.
//!
//! Everything served here is derived on request from the stored completion
//! records and membership; see [`crate::services::ledger`].

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CompletionStats, ConsistencyPoint, RewardSummary, StreakResult, UserStatistics};
use crate::routes::users::load_own_user;
use crate::services::ledger::{
    compute_completion_rate, compute_consistency, compute_daily_stats, compute_streaks,
    DEFAULT_CONSISTENCY_WINDOW_DAYS,
};
use crate::services::points::{consolidate_points, reward_summary};
use crate::time_utils::{days_between, parse_day, today_utc, MAX_CLIENT_DAY_SKEW};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/statistics/{user_id}", get(get_statistics))
        .route("/api/dashboard", get(get_dashboard))
}

#[derive(Deserialize)]
pub struct TodayQuery {
    /// Client's local calendar day (`YYYY-MM-DD`)
    pub today: Option<String>,
}

/// Resolve the reference day for streak and window calculations.
///
/// Clients east or west of UTC may legitimately be one day ahead or behind;
/// anything further out is rejected.
pub(crate) fn resolve_today(raw: Option<&str>, utc_today: NaiveDate) -> Result<NaiveDate> {
    let Some(raw) = raw else {
        return Ok(utc_today);
    };

    let day = parse_day(raw).ok_or_else(|| {
        AppError::BadRequest(format!("Invalid today '{}': expected YYYY-MM-DD", raw))
    })?;

    if days_between(utc_today, day).abs() > MAX_CLIENT_DAY_SKEW {
        return Err(AppError::BadRequest(format!(
            "today '{}' is more than one day away from {}",
            raw, utc_today
        )));
    }

    Ok(day)
}

/// Flat statistics for the profile page.
async fn get_statistics(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(params): Query<TodayQuery>,
) -> Result<Json<UserStatistics>> {
    let today = resolve_today(params.today.as_deref(), today_utc())?;
    let user = load_own_user(&state, &auth, &user_id).await?;
    let completions = state.db.get_completions_for_user(&user_id).await?;

    let expected = consolidate_points(&completions, state.config.points_per_completion);
    if expected != user.points {
        tracing::warn!(
            user_id = %user_id,
            stored = user.points,
            expected,
            "Stored points disagree with completion history"
        );
    }

    let streaks = compute_streaks(&completions, today);

    Ok(Json(UserStatistics {
        total_points: user.points,
        total_completions: completions.len() as u32,
        total_challenges: user.challenges.len() as u32,
        current_streak: streaks.current_streak,
        longest_streak: streaks.longest_streak,
        completion_rate: compute_completion_rate(&completions, &user.challenges),
    }))
}

/// Everything the dashboard renders in one response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub today: NaiveDate,
    pub stats: CompletionStats,
    pub consistency: Vec<ConsistencyPoint>,
    pub streaks: StreakResult,
    pub rewards: RewardSummary,
    pub completion_rate: u32,
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<TodayQuery>,
) -> Result<Json<DashboardResponse>> {
    let today = resolve_today(params.today.as_deref(), today_utc())?;
    let user = load_own_user(&state, &auth, &auth.user_id).await?;
    let completions = state.db.get_completions_for_user(&user.id).await?;

    let consistency = compute_consistency(&completions, today, DEFAULT_CONSISTENCY_WINDOW_DAYS);
    tracing::debug!(
        user_id = %user.id,
        completions = completions.len(),
        window_total = consistency.total(),
        "Dashboard computed"
    );

    Ok(Json(DashboardResponse {
        today,
        stats: compute_daily_stats(&completions, &user.challenges, today),
        consistency: consistency.iter().collect(),
        streaks: compute_streaks(&completions, today),
        rewards: reward_summary(user.points),
        completion_rate: compute_completion_rate(&completions, &user.challenges),
    }))
}
