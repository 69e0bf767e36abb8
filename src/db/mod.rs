// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers talk to a [`Store`]; the ledger analysis never does. Two
//! implementations exist: [`FirestoreDb`] for deployments and [`MemoryDb`]
//! for local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Challenge, ChatMessage, CompletionRecord, User};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Email uniqueness index (keyed by encoded lowercase email)
    pub const USER_EMAILS: &str = "user_emails";
    pub const CHALLENGES: &str = "challenges";
    /// Keyed by `{user}_{challenge}_{date}`
    pub const COMPLETIONS: &str = "completions";
    pub const CHAT_MESSAGES: &str = "chat_messages";
    /// Join markers keyed by `{user}_{challenge}`
    pub const MEMBERSHIPS: &str = "memberships";
}

/// Most recent chat messages returned per challenge.
pub const CHAT_HISTORY_LIMIT: u32 = 100;

/// Persistence operations, one group per collection.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Create a user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, user: &User) -> Result<(), AppError>;

    /// Overwrite profile fields (name, theme, picture). Points and
    /// membership are left untouched.
    async fn update_user(&self, user: &User) -> Result<(), AppError>;

    /// Replace the stored points balance.
    async fn set_points(&self, user_id: &str, points: u64) -> Result<(), AppError>;

    /// Zero the points balance, clear membership and delete all of the
    /// user's completions. Returns the updated user.
    async fn reset_user_progress(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// Users who joined `challenge_id`.
    async fn get_participants(&self, challenge_id: &str) -> Result<Vec<User>, AppError>;

    // ─── Challenges ──────────────────────────────────────────────

    /// All challenges, newest first.
    async fn list_challenges(&self) -> Result<Vec<Challenge>, AppError>;

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>, AppError>;

    async fn create_challenge(&self, challenge: &Challenge) -> Result<(), AppError>;

    async fn count_challenges(&self) -> Result<usize, AppError>;

    /// Add the challenge to the user's membership and bump its participant
    /// count. Returns `false` (and changes nothing) if already a member.
    async fn join_challenge(&self, user_id: &str, challenge_id: &str) -> Result<bool, AppError>;

    // ─── Completions ─────────────────────────────────────────────

    /// All completions of one user, newest first.
    async fn get_completions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<CompletionRecord>, AppError>;

    /// All completions of one challenge, newest first.
    async fn get_completions_for_challenge(
        &self,
        challenge_id: &str,
    ) -> Result<Vec<CompletionRecord>, AppError>;

    /// Store a completion and credit `points` to its user in one step.
    ///
    /// Fails with `Conflict` if the user already completed the challenge on
    /// that day; nothing is credited in that case.
    async fn record_completion(
        &self,
        completion: &CompletionRecord,
        points: u32,
    ) -> Result<(), AppError>;

    // ─── Chat ────────────────────────────────────────────────────

    /// The latest `limit` messages of a challenge, oldest first.
    async fn get_chat_messages(
        &self,
        challenge_id: &str,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, AppError>;

    async fn add_chat_message(&self, message: &ChatMessage) -> Result<(), AppError>;
}

/// Normalize an email for lookups and the uniqueness index.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
