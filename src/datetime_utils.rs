//! # Date and Time Utilities
//!
//! The weekly tide table renders only a bare day-of-month number per row, but
//! the table always starts at "today", so the full calendar date can be
//! inferred from the current date. This module performs that inference, plus
//! clock-time parsing ("3:36am") and the date/time combination that produces
//! the final timestamps.
//!
//! These are not generic utilities: [`resolve_day`] supports only the 7-day
//! window the table can show, so at most one month boundary is ever crossed.
//! All functions take their reference date explicitly so tests can freeze
//! "today".

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Resolve a bare day-of-month number from the weekly table to a full
/// calendar date, using `today` as the reference point.
///
/// If `queried_day` is smaller than today's day number, the table window has
/// crossed into the next month. A December rollover wraps to January of the
/// following year. No multi-month wrap is supported; the table only ever
/// spans 7 days.
///
/// Returns `None` when `queried_day` is not a valid day for the resolved
/// month (e.g. 31 in a 30-day month). Callers should surface that as a
/// malformed-input error rather than guessing a date.
pub fn resolve_day(today: NaiveDate, queried_day: u32) -> Option<NaiveDate> {
    use chrono::Datelike;

    let mut month = today.month();
    let mut year = today.year();

    if queried_day < today.day() {
        month += 1;
    }
    if month > 12 {
        month = 1;
        year += 1;
    }

    NaiveDate::from_ymd_opt(year, month, queried_day)
}

/// Parse a clock-time string from the table, e.g. `"3:36am"` or `"12:05 pm"`.
///
/// The hour may be one or two digits; minutes are always two. The am/pm
/// marker may be separated from the digits by whitespace. Follows the usual
/// conventions: 12am is midnight, 12pm is noon.
pub fn parse_clock(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();

    let (digits, pm) = if let Some(rest) = lower.strip_suffix("am") {
        (rest.trim_end(), false)
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest.trim_end(), true)
    } else {
        return None;
    };

    let (hh, mm) = digits.split_once(':')?;
    let hour: u32 = hh.parse().ok()?;
    let minute: u32 = mm.parse().ok()?;
    if !(1..=12).contains(&hour) || mm.len() != 2 {
        return None;
    }

    let hour24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };

    NaiveTime::from_hms_opt(hour24, minute, 0)
}

/// Combine a resolved calendar date with a parsed clock time into a single
/// timestamp. Pure; no failure modes beyond what the inputs already carry.
pub fn combine(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}
