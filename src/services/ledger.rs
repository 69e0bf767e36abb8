// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completion ledger analysis.
//!
//! Pure functions over one user's completion records and challenge
//! membership:
//! - today's completed/pending counts
//! - a trailing consistency window (completions per day)
//! - current and longest daily streaks
//! - the overall completion rate
//!
//! The reference day is always an explicit argument, so results never depend
//! on the wall clock. Inputs are assumed to satisfy the one-record-per
//! `(user, challenge, day)` rule that the store enforces.

use chrono::{Days, NaiveDate};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{
    ChallengeMembership, CompletionRecord, CompletionStats, ConsistencyPoint, StreakResult,
};
use crate::time_utils::days_between;

/// Length of the dashboard consistency window.
pub const DEFAULT_CONSISTENCY_WINDOW_DAYS: u32 = 7;

/// Count today's completions against the user's joined challenges.
///
/// `completed_today` counts distinct challenges. `pending_today` never goes
/// below zero, even when completions outnumber current memberships (possible
/// right after a reset).
pub fn compute_daily_stats(
    completions: &[CompletionRecord],
    membership: &ChallengeMembership,
    today: NaiveDate,
) -> CompletionStats {
    let completed: HashSet<&str> = completions
        .iter()
        .filter(|c| c.date == today)
        .map(|c| c.challenge_id.as_str())
        .collect();

    let completed_today = completed.len() as u32;
    let total_active_challenges = membership.len() as u32;

    CompletionStats {
        completed_today,
        pending_today: total_active_challenges.saturating_sub(completed_today),
        total_active_challenges,
    }
}

/// Build the trailing `window_days` consistency window ending at `today`.
///
/// Counting happens once here; iterating the result is lazy and can be
/// repeated any number of times. The window always ends at `today`; one that
/// would reach before the earliest representable date is shortened to start
/// there.
pub fn compute_consistency(
    completions: &[CompletionRecord],
    today: NaiveDate,
    window_days: u32,
) -> Consistency {
    let representable = days_between(NaiveDate::MIN, today).saturating_add(1);
    let window_days = u32::try_from(representable)
        .map_or(window_days, |max| window_days.min(max));

    let start = today
        .checked_sub_days(Days::new(u64::from(window_days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN);

    let mut counts: HashMap<NaiveDate, u32> = HashMap::new();
    for completion in completions {
        if completion.date >= start && completion.date <= today {
            *counts.entry(completion.date).or_insert(0) += 1;
        }
    }

    Consistency {
        start,
        window_days,
        counts,
    }
}

/// Per-day completion counts for a fixed window of calendar days.
#[derive(Debug, Clone)]
pub struct Consistency {
    start: NaiveDate,
    window_days: u32,
    counts: HashMap<NaiveDate, u32>,
}

impl Consistency {
    /// Iterate the window oldest to newest.
    pub fn iter(&self) -> ConsistencyIter<'_> {
        ConsistencyIter {
            consistency: self,
            offset: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.window_days as usize
    }

    pub fn is_empty(&self) -> bool {
        self.window_days == 0
    }

    /// Total completions inside the window.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    fn point_at(&self, offset: u32) -> Option<ConsistencyPoint> {
        let date = self.start.checked_add_days(Days::new(u64::from(offset)))?;
        Some(ConsistencyPoint {
            date,
            day: date.format("%a").to_string(),
            completions: self.counts.get(&date).copied().unwrap_or(0),
        })
    }
}

impl<'a> IntoIterator for &'a Consistency {
    type Item = ConsistencyPoint;
    type IntoIter = ConsistencyIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`Consistency`] window.
#[derive(Debug, Clone)]
pub struct ConsistencyIter<'a> {
    consistency: &'a Consistency,
    offset: u32,
}

impl Iterator for ConsistencyIter<'_> {
    type Item = ConsistencyPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.consistency.window_days {
            return None;
        }
        let point = self.consistency.point_at(self.offset);
        self.offset += 1;
        point
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.consistency.window_days.saturating_sub(self.offset) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ConsistencyIter<'_> {}

/// Compute current and longest streaks of consecutive completion days.
///
/// Several completions on one day count once. The current streak is the final
/// run, but only while it is still alive: its last day must be `today` or the
/// day before.
pub fn compute_streaks(completions: &[CompletionRecord], today: NaiveDate) -> StreakResult {
    let dates: BTreeSet<NaiveDate> = completions.iter().map(|c| c.date).collect();

    let mut run = 0u32;
    let mut longest = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for &date in &dates {
        run = match previous {
            Some(prev) if days_between(prev, date) == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    let current = match previous {
        Some(last) if matches!(days_between(last, today), 0 | 1) => run,
        _ => 0,
    };

    StreakResult {
        current_streak: current,
        longest_streak: longest,
    }
}

/// Completions per joined challenge, in percent, rounded half up.
///
/// This is a ratio of records to challenge slots, not a bounded percentage:
/// five completions across two challenges yields 250.
pub fn compute_completion_rate(
    completions: &[CompletionRecord],
    membership: &ChallengeMembership,
) -> u32 {
    let completions = completions.len() as u64;
    let slots = membership.len().max(1) as u64;
    // round(100 * c / s) without floating point
    let rate = (200 * completions + slots) / (2 * slots);
    u32::try_from(rate).unwrap_or(u32::MAX)
}

/// Distinct days in `year`-`month` with at least one completion, ascending.
pub fn completed_days_in_month(
    completions: &[CompletionRecord],
    year: i32,
    month: u32,
) -> Vec<NaiveDate> {
    use chrono::Datelike;

    completions
        .iter()
        .map(|c| c.date)
        .filter(|d| d.year() == year && d.month() == month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
