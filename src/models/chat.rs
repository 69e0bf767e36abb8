// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-challenge chat message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A message posted to a challenge's chat room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChatMessage {
    pub id: String,
    pub challenge_id: String,
    pub user_id: String,
    /// Sender's display name at the time of posting
    pub user_name: String,
    pub message: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
}
