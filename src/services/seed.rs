// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Built-in sample challenges for a fresh database.

use chrono::Utc;

use crate::db::Store;
use crate::error::Result;
use crate::models::Challenge;

/// Owner ID recorded on the sample challenges.
pub const SYSTEM_USER_ID: &str = "system";

/// (title, description, category, participants)
const SAMPLE_CHALLENGES: &[(&str, &str, &str, u32)] = &[
    (
        "30-Day Meditation",
        "Meditate for 10 minutes every day to improve focus and reduce stress",
        "Wellness",
        42,
    ),
    (
        "Read 30 Pages Daily",
        "Build a reading habit by reading 30 pages every day",
        "Learning",
        78,
    ),
    (
        "Drink 8 Glasses of Water",
        "Stay hydrated throughout the day for better health",
        "Health",
        156,
    ),
    (
        "Morning Workout",
        "Exercise for 30 minutes every morning to boost energy",
        "Fitness",
        93,
    ),
    (
        "Gratitude Journal",
        "Write 3 things you're grateful for each day",
        "Mindfulness",
        67,
    ),
];

/// Build the sample challenge records.
pub fn sample_challenges() -> Vec<Challenge> {
    let now = Utc::now();
    SAMPLE_CHALLENGES
        .iter()
        .map(|&(title, description, category, participants)| Challenge {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: Some(category.to_string()),
            created_by: SYSTEM_USER_ID.to_string(),
            created_at: now,
            participants,
        })
        .collect()
}

/// Insert the samples if the challenge collection is empty.
///
/// Returns the number of challenges inserted.
pub async fn seed_sample_challenges(db: &dyn Store) -> Result<usize> {
    if db.count_challenges().await? > 0 {
        tracing::debug!("Challenges already exist, skipping seed");
        return Ok(0);
    }

    let challenges = sample_challenges();
    for challenge in &challenges {
        db.create_challenge(challenge).await?;
    }

    tracing::info!(count = challenges.len(), "Seeded sample challenges");
    Ok(challenges.len())
}
