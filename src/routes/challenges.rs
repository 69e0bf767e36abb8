// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge catalog, creation and membership routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Challenge, Participant};
use crate::services::seed::seed_sample_challenges;
use crate::AppState;

const MAX_QUERY_LEN: usize = 100;

/// Authenticated challenge routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/challenges", get(list_challenges).post(create_challenge))
        .route("/api/challenges/{id}/join", post(join_challenge))
        .route("/api/challenges/{id}/participants", get(get_participants))
}

/// Public seeding route.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/init-challenges", post(init_challenges))
}

#[derive(Deserialize)]
struct ListQuery {
    /// Search text matched against title, description and category
    q: Option<String>,
}

/// List challenges, newest first, optionally filtered.
async fn list_challenges(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Challenge>>> {
    let query = params.q.unwrap_or_default();
    if query.len() > MAX_QUERY_LEN {
        return Err(AppError::BadRequest(format!(
            "Search query must be at most {} characters",
            MAX_QUERY_LEN
        )));
    }

    let challenges = state
        .db
        .list_challenges()
        .await?
        .into_iter()
        .filter(|c| c.matches(&query))
        .collect();

    Ok(Json(challenges))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChallengeRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(length(max = 50))]
    pub category: Option<String>,
}

/// Create a challenge; the creator joins it immediately.
async fn create_challenge(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateChallengeRequest>,
) -> Result<(StatusCode, Json<Challenge>)> {
    body.validate()?;

    let mut challenge = Challenge {
        id: uuid::Uuid::new_v4().to_string(),
        title: body.title.trim().to_string(),
        description: body.description.trim().to_string(),
        category: body
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        created_by: auth.user_id.clone(),
        created_at: Utc::now(),
        participants: 0,
    };

    state.db.create_challenge(&challenge).await?;
    if state.db.join_challenge(&auth.user_id, &challenge.id).await? {
        challenge.participants += 1;
    }

    tracing::info!(
        user_id = %auth.user_id,
        challenge_id = %challenge.id,
        "Challenge created"
    );

    Ok((StatusCode::CREATED, Json(challenge)))
}

/// Join response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct JoinResponse {
    pub message: String,
    /// False when the user was already a member
    pub joined: bool,
    pub challenge: Challenge,
}

/// Join an existing challenge. Joining twice is a no-op.
async fn join_challenge(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(challenge_id): Path<String>,
) -> Result<Json<JoinResponse>> {
    if state.db.get_challenge(&challenge_id).await?.is_none() {
        return Err(AppError::NotFound("Challenge not found".to_string()));
    }

    let joined = state.db.join_challenge(&auth.user_id, &challenge_id).await?;

    let challenge = state
        .db
        .get_challenge(&challenge_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Challenge not found".to_string()))?;

    let message = if joined {
        "Successfully joined challenge"
    } else {
        "Already a member of this challenge"
    };

    Ok(Json(JoinResponse {
        message: message.to_string(),
        joined,
        challenge,
    }))
}

/// Users who joined a challenge, highest points first.
async fn get_participants(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<String>,
) -> Result<Json<Vec<Participant>>> {
    let participants = state
        .db
        .get_participants(&challenge_id)
        .await?
        .iter()
        .map(|u| u.participant())
        .collect();
    Ok(Json(participants))
}

#[derive(Serialize)]
pub struct InitChallengesResponse {
    pub message: String,
    pub created: usize,
}

/// Insert the sample challenges into an empty catalog.
async fn init_challenges(State(state): State<Arc<AppState>>) -> Result<Json<InitChallengesResponse>> {
    let created = seed_sample_challenges(state.db.as_ref()).await?;
    let message = if created > 0 {
        "Sample challenges created successfully"
    } else {
        "Challenges already exist"
    };

    Ok(Json(InitChallengesResponse {
        message: message.to_string(),
        created,
    }))
}
