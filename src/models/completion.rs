// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Completion record model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Proof that a user performed a challenge's habit on a calendar day.
///
/// Immutable once stored. At most one record exists per
/// `(user_id, challenge_id, date)`; see [`CompletionRecord::document_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompletionRecord {
    pub user_id: String,
    pub challenge_id: String,
    /// Calendar day the habit was performed (`YYYY-MM-DD`)
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    /// Opaque photo reference (URL or data URL)
    pub photo: String,
    /// When the record was stored
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub recorded_at: DateTime<Utc>,
}

impl CompletionRecord {
    /// Deterministic document ID enforcing the one-per-day uniqueness rule.
    pub fn document_id(&self) -> String {
        completion_document_id(&self.user_id, &self.challenge_id, self.date)
    }
}

/// Document ID for the completion of `challenge_id` by `user_id` on `date`.
pub fn completion_document_id(user_id: &str, challenge_id: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}",
        urlencoding::encode(user_id),
        urlencoding::encode(challenge_id),
        date.format(crate::time_utils::DAY_FORMAT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_per_user_challenge_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let record = CompletionRecord {
            user_id: "u1".to_string(),
            challenge_id: "c/1".to_string(),
            date,
            photo: "data:image/png;base64,AAAA".to_string(),
            recorded_at: Utc::now(),
        };

        assert_eq!(record.document_id(), "u1_c%2F1_2024-01-03");

        let next_day = CompletionRecord {
            date: date.succ_opt().unwrap(),
            ..record.clone()
        };
        assert_ne!(record.document_id(), next_day.document_id());
    }

    #[test]
    fn test_date_serializes_as_calendar_day() {
        let record = CompletionRecord {
            user_id: "u1".to_string(),
            challenge_id: "c1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            photo: "p".to_string(),
            recorded_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-02-29");
        assert_eq!(json["challengeId"], "c1");
    }
}
