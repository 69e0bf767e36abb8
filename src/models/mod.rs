// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod challenge;
pub mod chat;
pub mod completion;
pub mod stats;
pub mod user;

pub use challenge::{Challenge, ChallengeMembership};
pub use chat::ChatMessage;
pub use completion::CompletionRecord;
pub use stats::{CompletionStats, ConsistencyPoint, RewardSummary, StreakResult, UserStatistics};
pub use user::{Participant, Theme, User, UserProfile};
