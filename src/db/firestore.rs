// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles plus an email uniqueness index)
//! - Challenges
//! - Completions (one document per user, challenge and day)
//! - Chat messages

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;
use firestore::{path, paths, FirestoreWritePrecondition};
use serde::{Deserialize, Serialize};

use crate::db::{collections, normalize_email, Store};
use crate::error::AppError;
use crate::models::{Challenge, ChatMessage, CompletionRecord, User};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Document in the email uniqueness index.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmailIndexEntry {
    user_id: String,
}

/// Marker document for one user's membership in one challenge.
///
/// Written with an `Exists(false)` precondition so that concurrent joins
/// by the same user count the participant once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembershipMarker {
    user_id: String,
    challenge_id: String,
    joined_at: DateTime<Utc>,
}

impl MembershipMarker {
    fn document_id(&self) -> String {
        membership_document_id(&self.user_id, &self.challenge_id)
    }
}

fn membership_document_id(user_id: &str, challenge_id: &str) -> String {
    format!(
        "{}_{}",
        urlencoding::encode(user_id),
        urlencoding::encode(challenge_id)
    )
}

/// Field mask target for [`Store::set_points`].
#[derive(Serialize, Deserialize)]
struct PointsUpdate {
    points: u64,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                self.client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    async fn query_completions(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Vec<CompletionRecord>, AppError> {
        let value = value.to_string();
        let mut records: Vec<CompletionRecord> = self
            .client
            .fluent()
            .select()
            .from(collections::COMPLETIONS)
            .filter(move |q| q.for_all([q.field(field).eq(value.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Sorted here rather than in the query to avoid a composite index
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(records)
    }

    async fn query_memberships(&self, user_id: &str) -> Result<Vec<MembershipMarker>, AppError> {
        let user_id = user_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::MEMBERSHIPS)
            .filter(move |q| q.for_all([q.field("userId").eq(user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Map a failed completion commit onto the caller-visible error.
    ///
    /// A precondition failure means another request stored the same
    /// completion first, which is re-checked by reading the document.
    async fn completion_commit_error(
        &self,
        completion: &CompletionRecord,
        err: FirestoreError,
    ) -> AppError {
        let existing: Result<Option<CompletionRecord>, FirestoreError> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::COMPLETIONS)
            .obj()
            .one(&completion.document_id())
            .await;

        match (existing, err) {
            (Ok(Some(_)), _) | (_, FirestoreError::DataConflictError(_)) => {
                AppError::Conflict("Challenge already completed for this date".to_string())
            }
            (_, FirestoreError::DataNotFoundError(_)) => {
                AppError::NotFound(format!("User {} not found", completion.user_id))
            }
            (_, e) => AppError::Database(format!("Transaction commit failed: {}", e)),
        }
    }
}

#[async_trait]
impl Store for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let key = urlencoding::encode(&normalize_email(email)).into_owned();
        let entry: Option<EmailIndexEntry> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::USER_EMAILS)
            .obj()
            .one(&key)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match entry {
            Some(entry) => self.get_user(&entry.user_id).await,
            None => Ok(None),
        }
    }

    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        // Claim the email first; insert fails if the document already exists.
        let key = urlencoding::encode(&normalize_email(&user.email)).into_owned();
        let claimed: Result<EmailIndexEntry, FirestoreError> = self
            .client
            .fluent()
            .insert()
            .into(collections::USER_EMAILS)
            .document_id(&key)
            .object(&EmailIndexEntry {
                user_id: user.id.clone(),
            })
            .execute()
            .await;

        match claimed {
            Ok(_) => {}
            Err(FirestoreError::DataConflictError(_)) => {
                return Err(AppError::Conflict("Email already registered".to_string()))
            }
            Err(e) => return Err(AppError::Database(e.to_string())),
        }

        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(user_id = %user.id, "Created user");
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        // Points and membership are owned by the completion, join and reset
        // paths; writing them here would race with concurrent credits.
        let _: () = self
            .client
            .fluent()
            .update()
            .fields(paths!(User::{name, theme, profile_picture}))
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataNotFoundError(_) => {
                    AppError::NotFound(format!("User {} not found", user.id))
                }
                e => AppError::Database(e.to_string()),
            })?;
        Ok(())
    }

    async fn set_points(&self, user_id: &str, points: u64) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .fields(paths!(PointsUpdate::{points}))
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(user_id)
            .object(&PointsUpdate { points })
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataNotFoundError(_) => {
                    AppError::NotFound(format!("User {} not found", user_id))
                }
                e => AppError::Database(e.to_string()),
            })?;
        Ok(())
    }

    async fn reset_user_progress(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let Some(mut user) = self.get_user(user_id).await? else {
            return Ok(None);
        };

        user.points = 0;
        user.challenges.clear();

        let _: () = self
            .client
            .fluent()
            .update()
            .fields(paths!(User::{points, challenges}))
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let memberships = self.query_memberships(user_id).await?;
        self.batch_delete(
            &memberships,
            collections::MEMBERSHIPS,
            MembershipMarker::document_id,
        )
        .await?;

        let completions = self.query_completions("userId", user_id).await?;
        let count = completions.len();
        self.batch_delete(
            &completions,
            collections::COMPLETIONS,
            CompletionRecord::document_id,
        )
        .await?;

        tracing::info!(user_id, deleted = count, "User progress reset");
        Ok(Some(user))
    }

    async fn get_participants(&self, challenge_id: &str) -> Result<Vec<User>, AppError> {
        let challenge_id = challenge_id.to_string();
        let mut users: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| {
                q.for_all([q
                    .field(path!(User::challenges))
                    .array_contains(challenge_id.clone())])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        users.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
        Ok(users)
    }

    // ─── Challenge Operations ────────────────────────────────────

    async fn list_challenges(&self) -> Result<Vec<Challenge>, AppError> {
        let mut challenges: Vec<Challenge> = self
            .client
            .fluent()
            .select()
            .from(collections::CHALLENGES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        challenges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(challenges)
    }

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::CHALLENGES)
            .obj()
            .one(challenge_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn create_challenge(&self, challenge: &Challenge) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::CHALLENGES)
            .document_id(&challenge.id)
            .object(challenge)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn count_challenges(&self) -> Result<usize, AppError> {
        Ok(self.list_challenges().await?.len())
    }

    async fn join_challenge(&self, user_id: &str, challenge_id: &str) -> Result<bool, AppError> {
        let user = self
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        if self.get_challenge(challenge_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Challenge {} not found",
                challenge_id
            )));
        }
        if user.challenges.contains(challenge_id) {
            tracing::debug!(user_id, challenge_id, "Already a member (idempotent skip)");
            return Ok(false);
        }

        let marker = MembershipMarker {
            user_id: user_id.to_string(),
            challenge_id: challenge_id.to_string(),
            joined_at: Utc::now(),
        };

        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        self.client
            .fluent()
            .update()
            .in_col(collections::MEMBERSHIPS)
            .precondition(FirestoreWritePrecondition::Exists(false))
            .document_id(marker.document_id())
            .object(&marker)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add membership to transaction: {}", e))
            })?;

        self.client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(user_id)
            .transforms(|t| {
                t.fields([t
                    .field(path!(User::challenges))
                    .append_missing_elements([challenge_id.to_string()])])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add user update to transaction: {}", e))
            })?;

        self.client
            .fluent()
            .update()
            .in_col(collections::CHALLENGES)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(challenge_id)
            .transforms(|t| {
                t.fields([t.field(path!(Challenge::participants)).increment(1)])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add challenge to transaction: {}", e))
            })?;

        match transaction.commit().await {
            Ok(_) => {}
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::debug!(user_id, challenge_id, "Concurrent join already counted");
                return Ok(false);
            }
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Transaction commit failed: {}",
                    e
                )))
            }
        }

        tracing::info!(user_id, challenge_id, "Joined challenge");
        Ok(true)
    }

    // ─── Completion Operations ───────────────────────────────────

    async fn get_completions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<CompletionRecord>, AppError> {
        self.query_completions("userId", user_id).await
    }

    async fn get_completions_for_challenge(
        &self,
        challenge_id: &str,
    ) -> Result<Vec<CompletionRecord>, AppError> {
        self.query_completions("challengeId", challenge_id).await
    }

    async fn record_completion(
        &self,
        completion: &CompletionRecord,
        points: u32,
    ) -> Result<(), AppError> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // The precondition fails the whole commit if the day is already
        // recorded, so the credit below is applied at most once.
        self.client
            .fluent()
            .update()
            .in_col(collections::COMPLETIONS)
            .precondition(FirestoreWritePrecondition::Exists(false))
            .document_id(completion.document_id())
            .object(completion)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add completion to transaction: {}", e))
            })?;

        self.client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(&completion.user_id)
            .transforms(|t| {
                t.fields([t.field(path!(User::points)).increment(i64::from(points))])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add points to transaction: {}", e))
            })?;

        if let Err(e) = transaction.commit().await {
            return Err(self.completion_commit_error(completion, e).await);
        }

        tracing::info!(
            user_id = %completion.user_id,
            challenge_id = %completion.challenge_id,
            date = %completion.date,
            points,
            "Completion recorded atomically"
        );
        Ok(())
    }

    // ─── Chat Operations ─────────────────────────────────────────

    async fn get_chat_messages(
        &self,
        challenge_id: &str,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let challenge_id = challenge_id.to_string();
        let mut messages: Vec<ChatMessage> = self
            .client
            .fluent()
            .select()
            .from(collections::CHAT_MESSAGES)
            .filter(move |q| q.for_all([q.field("challengeId").eq(challenge_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let skip = messages.len().saturating_sub(limit as usize);
        Ok(messages.split_off(skip))
    }

    async fn add_chat_message(&self, message: &ChatMessage) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::CHAT_MESSAGES)
            .document_id(&message.id)
            .object(message)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
