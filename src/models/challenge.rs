// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Challenge model and per-user challenge membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A habit template users can join.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Challenge {
    /// Generated challenge ID (also used as document ID)
    pub id: String,
    pub title: String,
    pub description: String,
    /// Free-form category ("Wellness", "Fitness", ...)
    pub category: Option<String>,
    /// User ID of the creator
    pub created_by: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    /// Number of users who joined
    pub participants: u32,
}

impl Challenge {
    /// Case-insensitive substring match over title, description and category.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
    }
}

/// The set of challenge IDs a user currently belongs to.
///
/// Grows through join/create and is cleared by a progress reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeMembership(BTreeSet<String>);

impl ChallengeMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a challenge. Returns `false` if already a member.
    pub fn join(&mut self, challenge_id: impl Into<String>) -> bool {
        self.0.insert(challenge_id.into())
    }

    pub fn contains(&self, challenge_id: &str) -> bool {
        self.0.contains(challenge_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for ChallengeMembership {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge(title: &str, description: &str, category: Option<&str>) -> Challenge {
        Challenge {
            id: "c1".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: category.map(String::from),
            created_by: "system".to_string(),
            created_at: Utc::now(),
            participants: 1,
        }
    }

    #[test]
    fn test_matches_any_field_case_insensitively() {
        let c = challenge("Morning Workout", "Exercise for 30 minutes", Some("Fitness"));

        assert!(c.matches("workout"));
        assert!(c.matches("EXERCISE"));
        assert!(c.matches("fit"));
        assert!(c.matches(""));
        assert!(!c.matches("meditation"));
    }

    #[test]
    fn test_matches_without_category() {
        let c = challenge("Read", "30 pages", None);
        assert!(!c.matches("learning"));
    }

    #[test]
    fn test_membership_join_is_idempotent() {
        let mut membership = ChallengeMembership::new();
        assert!(membership.join("c1"));
        assert!(!membership.join("c1"));
        assert!(membership.join("c2"));
        assert_eq!(membership.len(), 2);

        membership.clear();
        assert!(membership.is_empty());
    }

    #[test]
    fn test_membership_serializes_as_list() {
        let membership: ChallengeMembership = ["b", "a"].into_iter().collect();
        assert_eq!(serde_json::to_string(&membership).unwrap(), r#"["a","b"]"#);
    }
}
