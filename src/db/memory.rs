// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by concurrent maps.
//!
//! Used for local development (`STORAGE_BACKEND=memory`) and by the test
//! suite. Data does not survive a restart.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::db::{normalize_email, Store};
use crate::error::AppError;
use crate::models::{Challenge, ChatMessage, CompletionRecord, User};

/// In-memory database. Cloning shares the underlying maps.
#[derive(Clone, Default)]
pub struct MemoryDb {
    users: Arc<DashMap<String, User>>,
    /// normalized email -> user ID
    user_emails: Arc<DashMap<String, String>>,
    challenges: Arc<DashMap<String, Challenge>>,
    /// completion document ID -> record
    completions: Arc<DashMap<String, CompletionRecord>>,
    /// challenge ID -> messages in posting order
    chat_messages: Arc<DashMap<String, Vec<ChatMessage>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn user_not_found(user_id: &str) -> AppError {
        AppError::NotFound(format!("User {} not found", user_id))
    }
}

fn newest_first(mut records: Vec<CompletionRecord>) -> Vec<CompletionRecord> {
    records.sort_by(|a, b| {
        b.recorded_at
            .cmp(&a.recorded_at)
            .then_with(|| b.date.cmp(&a.date))
    });
    records
}

#[async_trait]
impl Store for MemoryDb {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let Some(user_id) = self
            .user_emails
            .get(&normalize_email(email))
            .map(|id| id.clone())
        else {
            return Ok(None);
        };
        self.get_user(&user_id).await
    }

    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        match self.user_emails.entry(normalize_email(&user.email)) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict("Email already registered".to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
            }
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let mut stored = self
            .users
            .get_mut(&user.id)
            .ok_or_else(|| Self::user_not_found(&user.id))?;
        stored.name = user.name.clone();
        stored.theme = user.theme;
        stored.profile_picture = user.profile_picture.clone();
        Ok(())
    }

    async fn set_points(&self, user_id: &str, points: u64) -> Result<(), AppError> {
        let mut stored = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| Self::user_not_found(user_id))?;
        stored.points = points;
        Ok(())
    }

    async fn reset_user_progress(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let updated = match self.users.get_mut(user_id) {
            Some(mut user) => {
                user.points = 0;
                user.challenges.clear();
                user.clone()
            }
            None => return Ok(None),
        };

        self.completions.retain(|_, c| c.user_id != user_id);
        Ok(Some(updated))
    }

    async fn get_participants(&self, challenge_id: &str) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.challenges.contains(challenge_id))
            .map(|u| u.clone())
            .collect();
        users.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
        Ok(users)
    }

    // ─── Challenges ──────────────────────────────────────────────

    async fn list_challenges(&self) -> Result<Vec<Challenge>, AppError> {
        let mut challenges: Vec<Challenge> =
            self.challenges.iter().map(|c| c.clone()).collect();
        challenges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(challenges)
    }

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>, AppError> {
        Ok(self.challenges.get(challenge_id).map(|c| c.clone()))
    }

    async fn create_challenge(&self, challenge: &Challenge) -> Result<(), AppError> {
        self.challenges
            .insert(challenge.id.clone(), challenge.clone());
        Ok(())
    }

    async fn count_challenges(&self) -> Result<usize, AppError> {
        Ok(self.challenges.len())
    }

    async fn join_challenge(&self, user_id: &str, challenge_id: &str) -> Result<bool, AppError> {
        if !self.challenges.contains_key(challenge_id) {
            return Err(AppError::NotFound(format!(
                "Challenge {} not found",
                challenge_id
            )));
        }

        let joined = {
            let mut user = self
                .users
                .get_mut(user_id)
                .ok_or_else(|| Self::user_not_found(user_id))?;
            user.challenges.join(challenge_id)
        };

        if joined {
            let mut challenge = self.challenges.get_mut(challenge_id).ok_or_else(|| {
                AppError::NotFound(format!("Challenge {} not found", challenge_id))
            })?;
            challenge.participants = challenge.participants.saturating_add(1);
        }
        Ok(joined)
    }

    // ─── Completions ─────────────────────────────────────────────

    async fn get_completions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<CompletionRecord>, AppError> {
        Ok(newest_first(
            self.completions
                .iter()
                .filter(|c| c.user_id == user_id)
                .map(|c| c.clone())
                .collect(),
        ))
    }

    async fn get_completions_for_challenge(
        &self,
        challenge_id: &str,
    ) -> Result<Vec<CompletionRecord>, AppError> {
        Ok(newest_first(
            self.completions
                .iter()
                .filter(|c| c.challenge_id == challenge_id)
                .map(|c| c.clone())
                .collect(),
        ))
    }

    async fn record_completion(
        &self,
        completion: &CompletionRecord,
        points: u32,
    ) -> Result<(), AppError> {
        // Hold the user entry for the whole operation so a concurrent reset
        // cannot interleave between the insert and the credit.
        let mut user = self
            .users
            .get_mut(&completion.user_id)
            .ok_or_else(|| Self::user_not_found(&completion.user_id))?;

        match self.completions.entry(completion.document_id()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(
                    "Challenge already completed for this date".to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(completion.clone());
            }
        }

        user.points = user.points.saturating_add(u64::from(points));
        Ok(())
    }

    // ─── Chat ────────────────────────────────────────────────────

    async fn get_chat_messages(
        &self,
        challenge_id: &str,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, AppError> {
        Ok(self
            .chat_messages
            .get(challenge_id)
            .map(|messages| {
                let skip = messages.len().saturating_sub(limit as usize);
                messages[skip..].to_vec()
            })
            .unwrap_or_default())
    }

    async fn add_chat_message(&self, message: &ChatMessage) -> Result<(), AppError> {
        self.chat_messages
            .entry(message.challenge_id.clone())
            .or_default()
            .push(message.clone());
        Ok(())
    }
}
