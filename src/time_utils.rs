// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar days and timestamps.
//!
//! Completions are keyed by calendar day (`NaiveDate`), never by instant, so
//! "consecutive day" checks are plain day arithmetic and unaffected by
//! daylight-saving transitions.

use chrono::{NaiveDate, Utc};

/// Wire format for calendar days.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// How many days a client's local calendar day may differ from the UTC day.
pub const MAX_CLIENT_DAY_SKEW: i64 = 1;

/// The current calendar day in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DAY_FORMAT).ok()
}

/// Signed number of calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Parse a `YYYY-MM` month key into (year, month).
pub fn parse_month(raw: &str) -> Option<(i32, u32)> {
    let (year, month) = raw.trim().split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    // Validates the month range
    NaiveDate::from_ymd_opt(year, month, 1)?;
    Some((year, month))
}
