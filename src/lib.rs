//! # Tidesapp Core Library
//!
//! This library retrieves and parses weekly tide tables from tideschart.com.
//! It drives an injected browser-automation session (see [`browser::Browser`])
//! to navigate the site, resolves locations either from direct URLs or via the
//! site's search box, and parses the 7-row weekly tide table into per-day
//! high-tide timestamps.
//!
//! ## Pipeline
//!
//! 1. **Load**: parse the locations file (JSON) into a [`locations::LocationPlan`],
//!    validating the shape before any browser activity
//! 2. **Resolve**: validate direct URLs, or drive the search box with
//!    retry/backoff to land on a location's page
//! 3. **Retrieve**: wait for the weekly table, require exactly 7 rows
//! 4. **Parse**: tokenize each row into tide readings, keep the high tides
//! 5. **Accumulate**: collect an ordered week of high-tide timestamps per
//!    location
//!
//! ## Execution model
//!
//! Everything is single-threaded, synchronous and blocking. One browser
//! session is reused across all locations in a run; retry backoff and page
//! waits block the caller. The only retried condition is a search-results
//! timeout. Parse and table-shape errors indicate a site layout change and
//! fail immediately.
//!
//! ## Core Types
//!
//! - [`TideReading`]: one parsed tide extremum (time, direction, height)
//! - [`TideRow`]: the typed result of parsing one weekly-table row
//! - [`WeeklyTides`]: location label → ordered high-tide timestamps

use chrono::{NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Module declarations
pub mod backoff;
pub mod browser;
pub mod config;
pub mod datetime_utils;
pub mod error;
pub mod locations;
pub mod resolver;
pub mod retriever;
pub mod row_parser;
pub mod webdriver;

pub use error::TidesError;

/// Direction marker attached to a tide reading in the weekly table.
///
/// The site renders high tide with an up triangle (▲) and low tide with a
/// down triangle (▼). Low readings are parsed for grammar validation but are
/// not retained in the pipeline output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TideKind {
    High,
    Low,
}

/// A single tide extremum parsed from one weekly-table row.
///
/// The height unit (`ft`) is discarded during parsing; only the numeric
/// value is kept.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideReading {
    /// Time of day of the extremum
    pub time: NaiveTime,
    /// Rising (high) or falling (low) marker
    pub kind: TideKind,
    /// Tide height in feet
    pub height_ft: f32,
}

/// The typed result of parsing one row of the weekly tide table.
///
/// A row covers one calendar day and always carries 3 or 4 tide readings
/// (not every day has four tidal extrema), followed by sunrise and sunset
/// times. Readings appear in source order, which is chronological within
/// the day.
#[derive(Clone, Debug, PartialEq)]
pub struct TideRow {
    /// Three-letter weekday abbreviation from the table
    pub weekday: Weekday,
    /// Bare day-of-month number; the calendar date is inferred from "today"
    pub day_of_month: u32,
    /// 3 or 4 tide readings, in source (chronological) order
    pub tides: Vec<TideReading>,
    /// Sunrise time (marked ▲ in the table)
    pub sunrise: NaiveTime,
    /// Sunset time (marked ▼ in the table)
    pub sunset: NaiveTime,
}

/// Pipeline output: location label mapped to one week of high-tide
/// timestamps in chronological order.
///
/// Labels are the location URL with the `https://` scheme stripped.
pub type WeeklyTides = BTreeMap<String, Vec<NaiveDateTime>>;
