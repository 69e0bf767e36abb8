// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::db::CHAT_HISTORY_LIMIT;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::ChatMessage;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/chat/{challenge_id}",
        get(get_messages).post(post_message),
    )
}

async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>> {
    let messages = state
        .db
        .get_chat_messages(&challenge_id, CHAT_HISTORY_LIMIT)
        .await?;
    Ok(Json(messages))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostMessageRequest {
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(challenge_id): Path<String>,
    Json(body): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    body.validate()?;
    let text = body.message.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    if state.db.get_challenge(&challenge_id).await?.is_none() {
        return Err(AppError::NotFound("Challenge not found".to_string()));
    }

    // Sender name comes from the stored profile, never from the request
    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let message = ChatMessage {
        id: uuid::Uuid::new_v4().to_string(),
        challenge_id,
        user_id: user.id,
        user_name: user.name,
        message: text.to_string(),
        timestamp: Utc::now(),
    };

    state.db.add_chat_message(&message).await?;
    tracing::debug!(
        challenge_id = %message.challenge_id,
        user_id = %message.user_id,
        "Chat message posted"
    );

    Ok((StatusCode::CREATED, Json(message)))
}
