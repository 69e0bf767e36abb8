// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod ledger;
pub mod password;
pub mod points;
pub mod seed;

pub use ledger::{
    compute_completion_rate, compute_consistency, compute_daily_stats, compute_streaks,
    Consistency,
};
pub use points::{consolidate_points, reward_summary};
