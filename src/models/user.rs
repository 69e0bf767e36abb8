// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::challenge::ChallengeMembership;

/// Dashboard color themes offered by the frontend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Theme {
    #[default]
    PastelPink,
    PastelBlue,
    PastelPurple,
    PastelGreen,
}

/// User profile stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Generated user ID (also used as document ID)
    pub id: String,
    /// Login email, stored lowercased
    pub email: String,
    /// PBKDF2 password hash (see `services::password`)
    pub password_hash: String,
    /// Display name
    pub name: String,
    /// Points balance
    #[serde(default)]
    pub points: u64,
    /// Joined challenges
    #[serde(default)]
    pub challenges: ChallengeMembership,
    #[serde(default)]
    pub theme: Theme,
    /// Profile picture reference (URL or data URL)
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public view without the password hash.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            points: self.points,
            challenges: self.challenges.iter().cloned().collect(),
            theme: self.theme,
            profile_picture: self.profile_picture.clone(),
            created_at: self.created_at,
        }
    }

    /// Public view for participant lists.
    pub fn participant(&self) -> Participant {
        Participant {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            points: self.points,
        }
    }
}

/// User profile as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
    pub challenges: Vec<String>,
    pub theme: Theme,
    pub profile_picture: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

/// Challenge participant summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub email: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
}
