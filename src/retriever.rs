//! # Weekly Tide Retrieval
//!
//! Given a browser session positioned at (or navigable to) a location's
//! page, waits for the weekly tide table to render, requires exactly 7 rows
//! (one per day, row 0 = today), parses each row in order and concatenates
//! the high tides into one chronological sequence for the location.
//!
//! [`run_plan`] drives the whole pipeline for a loaded [`LocationPlan`]:
//! locations are processed sequentially to completion with a single shared
//! browser session, and the first error aborts the run.

use crate::backoff::Sleep;
use crate::browser::{Browser, Locator};
use crate::config::SiteConfig;
use crate::error::TidesError;
use crate::locations::LocationPlan;
use crate::resolver::{self, SearchDiagnostics};
use crate::row_parser;
use crate::WeeklyTides;
use chrono::{NaiveDate, NaiveDateTime};

/// Scrape the weekly table from the page the browser is currently on.
///
/// `location` names the location in errors. Fails with
/// [`TidesError::UnexpectedTableShape`] unless the table has exactly 7 rows.
pub fn weekly_tides(
    config: &SiteConfig,
    browser: &mut dyn Browser,
    location: &str,
    today: NaiveDate,
) -> Result<Vec<NaiveDateTime>, TidesError> {
    let rows_locator = Locator::xpath(config.locators.weekly_table_rows.clone());

    browser.wait_for(&rows_locator, config.long_wait())?;
    let rows = browser.find_elements(&rows_locator)?;
    if rows.len() != 7 {
        return Err(TidesError::UnexpectedTableShape {
            location: location.to_string(),
            found: rows.len(),
        });
    }

    let mut week = Vec::new();
    for row in &rows {
        let text = browser.read_text(row)?;
        week.extend(row_parser::high_tide_times(&text, today)?);
    }
    Ok(week)
}

/// Retrieve weekly high tides for every location in the plan.
///
/// Direct locations are navigated to by URL; search locations are resolved
/// through the search box first (the result click lands on the page). The
/// result map is keyed by location label and holds each location's week of
/// high-tide timestamps in chronological order.
pub fn run_plan(
    config: &SiteConfig,
    browser: &mut dyn Browser,
    sleeper: &mut dyn Sleep,
    plan: &LocationPlan,
    today: NaiveDate,
    diagnostics: &mut SearchDiagnostics,
) -> Result<WeeklyTides, TidesError> {
    let mut results = WeeklyTides::new();

    match plan {
        LocationPlan::Direct(urls) => {
            for location in urls {
                browser.navigate(&location.url)?;
                let label = location.label();
                let tides = weekly_tides(config, browser, &label, today)?;
                results.insert(label, tides);
            }
        }
        LocationPlan::Searches(searches) => {
            for search in searches {
                resolver::resolve_search(config, browser, sleeper, search, diagnostics)?;
                let tides = weekly_tides(config, browser, search.label(), today)?;
                results.insert(search.label().to_string(), tides);
            }
        }
    }

    Ok(results)
}
