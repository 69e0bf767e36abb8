// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Points ledger: awards, consolidation and reward conversion.

use crate::models::{CompletionRecord, RewardSummary};

/// Points needed before a balance can be redeemed.
pub const REWARD_STEP_POINTS: u64 = 100;

/// Points per unit of redeemable credit (100 points = 10 credit).
pub const POINTS_PER_CREDIT: u64 = 10;

/// Balance implied by the completion history alone.
///
/// Every stored completion was credited exactly once when it was recorded,
/// and a reset removes completions together with the balance, so the stored
/// balance should always equal this value.
pub fn consolidate_points(completions: &[CompletionRecord], points_per_completion: u32) -> u64 {
    completions.len() as u64 * u64::from(points_per_completion)
}

/// Express a points balance as redeemable credit.
pub fn reward_summary(points: u64) -> RewardSummary {
    RewardSummary {
        points,
        redeemable_credit: points / POINTS_PER_CREDIT,
        points_to_next_reward: REWARD_STEP_POINTS - points % REWARD_STEP_POINTS,
        can_redeem: points >= REWARD_STEP_POINTS,
    }
}
