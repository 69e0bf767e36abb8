// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Derived statistics over a user's completion history.
//!
//! Nothing here is persisted: every value is recomputed from the completion
//! records, the challenge membership and a reference day on each request.

use chrono::NaiveDate;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Current and longest runs of consecutive days with a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakResult {
    /// Run ending today or yesterday, 0 once a day has been missed
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Today's progress across the user's joined challenges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompletionStats {
    pub completed_today: u32,
    pub pending_today: u32,
    pub total_active_challenges: u32,
}

/// Completion count for one day of the consistency window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConsistencyPoint {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    /// Short weekday name ("Mon", "Tue", ...)
    pub day: String,
    pub completions: u32,
}

/// Points balance expressed as redeemable credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RewardSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
    /// Credit units the balance is worth
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub redeemable_credit: u64,
    /// Points still needed to reach the next reward step
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points_to_next_reward: u64,
    pub can_redeem: bool,
}

/// Flat statistics record served by `/api/statistics/{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserStatistics {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_points: u64,
    pub total_completions: u32,
    pub total_challenges: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Completions per joined challenge, in percent (may exceed 100)
    pub completion_rate: u32,
}
