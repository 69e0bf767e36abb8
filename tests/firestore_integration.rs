// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with FIRESTORE_EMULATOR_HOST pointing at it, e.g.
//! `FIRESTORE_EMULATOR_HOST=localhost:8080 cargo test --test firestore_integration`.
//!
//! The emulator provides a clean state for each test run; IDs are still
//! unique per test so reruns against a live emulator do not collide.

use chrono::{NaiveDate, Utc};
use habitflow::db::Store;
use habitflow::error::AppError;
use habitflow::models::{Challenge, ChallengeMembership, ChatMessage, CompletionRecord, Theme, User};

mod common;
use common::test_db;

/// Generate a unique ID for test isolation.
fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

fn test_user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        password_hash: "pbkdf2-sha256$1$c2FsdA$aGFzaA".to_string(),
        name: "Test User".to_string(),
        points: 0,
        challenges: ChallengeMembership::new(),
        theme: Theme::default(),
        profile_picture: None,
        created_at: Utc::now(),
    }
}

fn test_challenge(id: &str) -> Challenge {
    Challenge {
        id: id.to_string(),
        title: "Emulator Challenge".to_string(),
        description: "Runs against the emulator".to_string(),
        category: Some("Testing".to_string()),
        created_by: "system".to_string(),
        created_at: Utc::now(),
        participants: 0,
    }
}

fn completion(user_id: &str, challenge_id: &str, date: &str) -> CompletionRecord {
    CompletionRecord {
        user_id: user_id.to_string(),
        challenge_id: challenge_id.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        photo: "data:image/png;base64,AAAA".to_string(),
        recorded_at: Utc::now(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_creation_and_email_lookup() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");

    assert!(db.get_user(&user_id).await.unwrap().is_none());

    let user = test_user(&user_id);
    db.create_user(&user).await.unwrap();

    let fetched = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(fetched.email, user.email);
    assert_eq!(fetched.points, 0);

    let by_email = db
        .find_user_by_email(&user.email.to_uppercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user_id);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    require_emulator!();

    let db = test_db().await;
    let first = test_user(&unique_id("user"));
    db.create_user(&first).await.unwrap();

    let mut second = test_user(&unique_id("user"));
    second.email = first.email.clone();

    let result = db.create_user(&second).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(db.get_user(&second.id).await.unwrap().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// CHALLENGE & COMPLETION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_join_increments_participants_once() {
    require_emulator!();

    let db = test_db().await;
    let user = test_user(&unique_id("user"));
    let challenge = test_challenge(&unique_id("challenge"));
    db.create_user(&user).await.unwrap();
    db.create_challenge(&challenge).await.unwrap();

    assert!(db.join_challenge(&user.id, &challenge.id).await.unwrap());
    assert!(!db.join_challenge(&user.id, &challenge.id).await.unwrap());

    let stored = db.get_challenge(&challenge.id).await.unwrap().unwrap();
    assert_eq!(stored.participants, 1);

    let participants = db.get_participants(&challenge.id).await.unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].id, user.id);
}

#[tokio::test]
async fn test_record_completion_credits_once() {
    require_emulator!();

    let db = test_db().await;
    let user = test_user(&unique_id("user"));
    let challenge = test_challenge(&unique_id("challenge"));
    db.create_user(&user).await.unwrap();
    db.create_challenge(&challenge).await.unwrap();
    db.join_challenge(&user.id, &challenge.id).await.unwrap();

    let first = completion(&user.id, &challenge.id, "2024-03-09");
    db.record_completion(&first, 10).await.unwrap();

    let duplicate = completion(&user.id, &challenge.id, "2024-03-09");
    let result = db.record_completion(&duplicate, 10).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    db.record_completion(&completion(&user.id, &challenge.id, "2024-03-10"), 10)
        .await
        .unwrap();

    let stored = db.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(stored.points, 20);

    let completions = db.get_completions_for_user(&user.id).await.unwrap();
    assert_eq!(completions.len(), 2);
    // Newest first
    assert_eq!(completions[0].date.to_string(), "2024-03-10");

    let by_challenge = db.get_completions_for_challenge(&challenge.id).await.unwrap();
    assert_eq!(by_challenge.len(), 2);
}

#[tokio::test]
async fn test_reset_user_progress() {
    require_emulator!();

    let db = test_db().await;
    let user = test_user(&unique_id("user"));
    let challenge = test_challenge(&unique_id("challenge"));
    db.create_user(&user).await.unwrap();
    db.create_challenge(&challenge).await.unwrap();
    db.join_challenge(&user.id, &challenge.id).await.unwrap();
    db.record_completion(&completion(&user.id, &challenge.id, "2024-03-10"), 10)
        .await
        .unwrap();

    let reset = db.reset_user_progress(&user.id).await.unwrap().unwrap();
    assert_eq!(reset.points, 0);
    assert!(reset.challenges.is_empty());
    assert!(db
        .get_completions_for_user(&user.id)
        .await
        .unwrap()
        .is_empty());

    // Membership markers go with the reset, so rejoining counts again
    assert!(db.join_challenge(&user.id, &challenge.id).await.unwrap());
    let stored = db.get_challenge(&challenge.id).await.unwrap().unwrap();
    assert_eq!(stored.participants, 2);

    assert!(db
        .reset_user_progress(&unique_id("missing"))
        .await
        .unwrap()
        .is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// CHAT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_chat_history_is_chronological() {
    require_emulator!();

    let db = test_db().await;
    let challenge_id = unique_id("challenge");
    let base = Utc::now();

    for i in 0..3 {
        let message = ChatMessage {
            id: unique_id("msg"),
            challenge_id: challenge_id.clone(),
            user_id: "user".to_string(),
            user_name: "Test User".to_string(),
            message: format!("message {}", i),
            timestamp: base + chrono::Duration::seconds(i),
        };
        db.add_chat_message(&message).await.unwrap();
    }

    let latest_two = db.get_chat_messages(&challenge_id, 2).await.unwrap();
    let texts: Vec<&str> = latest_two.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, vec!["message 1", "message 2"]);
}
