//! # Pipeline Tests
//!
//! End-to-end tests for the location resolver and weekly retriever against a
//! scripted browser collaborator. These cover the behaviors that depend on
//! the browser boundary: table-shape validation, the search retry loop's
//! exact termination, and backoff scheduling, none of which touch a real
//! browser or sleep for real.

use chrono::{NaiveDate, NaiveDateTime};
use std::time::Duration;
use tidesapp_lib::backoff::{Sleep, DELAYS_SECS};
use tidesapp_lib::browser::{Browser, BrowserError, ElementHandle, Locator};
use tidesapp_lib::config::SiteConfig;
use tidesapp_lib::locations::{DirectLocation, LocationPlan, SearchLocation};
use tidesapp_lib::resolver::{resolve_search, SearchDiagnostics};
use tidesapp_lib::retriever::{run_plan, weekly_tides};
use tidesapp_lib::TidesError;

/// Sleeper that records requested delays instead of blocking.
#[derive(Default)]
struct RecordingSleep {
    slept: Vec<Duration>,
}

impl Sleep for RecordingSleep {
    fn sleep(&mut self, duration: Duration) {
        self.slept.push(duration);
    }
}

/// Scripted browser: serves a fixed set of weekly-table rows, and either
/// times out search-result waits forever or succeeds on the nth attempt.
struct MockBrowser {
    /// Row texts served for the weekly-table locator
    rows: Vec<String>,
    /// Attempt number (1-based) on which the search-results wait succeeds;
    /// `None` means it always times out
    search_succeeds_on: Option<u32>,
    /// Whether the rate-limit notice is present after a failed search
    rate_limit_notice: bool,
    search_result_waits: u32,
    navigations: Vec<String>,
    clicked: Vec<ElementHandle>,
    typed: Vec<String>,
}

impl MockBrowser {
    fn with_rows(rows: Vec<String>) -> Self {
        MockBrowser {
            rows,
            search_succeeds_on: None,
            rate_limit_notice: false,
            search_result_waits: 0,
            navigations: Vec::new(),
            clicked: Vec::new(),
            typed: Vec::new(),
        }
    }

    fn timeout(locator: &Locator) -> BrowserError {
        BrowserError::Timeout {
            timeout: Duration::from_secs(0),
            locator: locator.to_string(),
        }
    }
}

impl Browser for MockBrowser {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.navigations.push(url.to_string());
        Ok(())
    }

    fn wait_for(
        &mut self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<ElementHandle, BrowserError> {
        let expr = locator.expr();
        if expr.contains("search-item") {
            self.search_result_waits += 1;
            return match self.search_succeeds_on {
                Some(n) if self.search_result_waits >= n => {
                    Ok(ElementHandle("search-result".to_string()))
                }
                _ => Err(Self::timeout(locator)),
            };
        }
        if expr.contains("Too many search requests") {
            return if self.rate_limit_notice {
                Ok(ElementHandle("rate-limit-notice".to_string()))
            } else {
                Err(Self::timeout(locator))
            };
        }
        if expr.contains("searchInput") {
            return Ok(ElementHandle("search-input".to_string()));
        }
        if expr.contains("submit") {
            return Ok(ElementHandle("search-submit".to_string()));
        }
        if expr.contains("tbody/tr") {
            return match self.rows.first() {
                Some(_) => Ok(ElementHandle("row-0".to_string())),
                None => Err(Self::timeout(locator)),
            };
        }
        Err(BrowserError::NotFound(expr.to_string()))
    }

    fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>, BrowserError> {
        if locator.expr().contains("tbody/tr") {
            return Ok((0..self.rows.len())
                .map(|i| ElementHandle(format!("row-{}", i)))
                .collect());
        }
        Ok(Vec::new())
    }

    fn read_text(&mut self, element: &ElementHandle) -> Result<String, BrowserError> {
        let index: usize = element
            .0
            .strip_prefix("row-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| BrowserError::NotFound(element.0.clone()))?;
        self.rows
            .get(index)
            .cloned()
            .ok_or_else(|| BrowserError::NotFound(element.0.clone()))
    }

    fn send_keys(&mut self, _element: &ElementHandle, text: &str) -> Result<(), BrowserError> {
        self.typed.push(text.to_string());
        Ok(())
    }

    fn click(&mut self, element: &ElementHandle) -> Result<(), BrowserError> {
        self.clicked.push(element.clone());
        Ok(())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 9, 21).unwrap()
}

fn ts(d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 9, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// A full week of valid rows starting at day-of-month `start_day`, each with
/// two high tides (9:09am and 9:17pm).
fn week_of_rows(start_day: u32) -> Vec<String> {
    (0..7)
        .map(|offset| {
            format!(
                "Mon {} 3:36am ▼ 0.98 ft 9:09am ▲ 6.56 ft 3:41pm ▼ 1.64 ft \
                 9:17pm ▲ 7.55 ft ▲ 5:57am ▼ 7:35pm",
                start_day + offset
            )
        })
        .collect()
}

fn salisbury_search() -> SearchLocation {
    SearchLocation {
        query: "Salisbury, MA".to_string(),
        hint: "Essex-County/Salisbury".to_string(),
    }
}

#[test]
fn retrieves_a_week_of_high_tides_from_current_page() {
    let config = SiteConfig::default();
    let mut browser = MockBrowser::with_rows(week_of_rows(21));

    let tides = weekly_tides(&config, &mut browser, "test-location", today()).unwrap();

    // 7 days, 2 high tides each, in chronological order
    assert_eq!(tides.len(), 14);
    assert_eq!(tides[0], ts(21, 9, 9));
    assert_eq!(tides[1], ts(21, 21, 17));
    assert_eq!(tides[13], ts(27, 21, 17));
    for pair in tides.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn rejects_table_with_wrong_row_count() {
    let config = SiteConfig::default();
    let mut rows = week_of_rows(21);
    rows.pop();
    let mut browser = MockBrowser::with_rows(rows);

    let err = weekly_tides(&config, &mut browser, "test-location", today()).unwrap_err();
    match err {
        TidesError::UnexpectedTableShape { location, found } => {
            assert_eq!(location, "test-location");
            assert_eq!(found, 6);
        }
        other => panic!("expected UnexpectedTableShape, got {:?}", other),
    }
}

#[test]
fn malformed_row_aborts_the_location() {
    let config = SiteConfig::default();
    let mut rows = week_of_rows(21);
    rows[3] = "Thu 24 not tide data at all".to_string();
    let mut browser = MockBrowser::with_rows(rows);

    let err = weekly_tides(&config, &mut browser, "test-location", today()).unwrap_err();
    assert!(matches!(err, TidesError::MalformedRow { .. }));
}

#[test]
fn run_plan_visits_each_direct_url_and_keys_by_label() {
    let config = SiteConfig::default();
    let plan = LocationPlan::Direct(vec![
        DirectLocation {
            url: "https://www.tideschart.com/United-States/Massachusetts/Essex-County/Salisbury/"
                .to_string(),
        },
        DirectLocation {
            url: "https://www.tideschart.com/United-States/Massachusetts/Essex-County/Rowley/"
                .to_string(),
        },
    ]);
    let mut browser = MockBrowser::with_rows(week_of_rows(21));
    let mut sleeper = RecordingSleep::default();
    let mut diagnostics = SearchDiagnostics::default();

    let results = run_plan(
        &config,
        &mut browser,
        &mut sleeper,
        &plan,
        today(),
        &mut diagnostics,
    )
    .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results
        .contains_key("www.tideschart.com/United-States/Massachusetts/Essex-County/Salisbury/"));
    assert!(results
        .contains_key("www.tideschart.com/United-States/Massachusetts/Essex-County/Rowley/"));
    for tides in results.values() {
        assert_eq!(tides.len(), 14);
    }

    // One navigation per location, in plan order
    assert_eq!(browser.navigations.len(), 2);
    assert!(browser.navigations[0].ends_with("Salisbury/"));
    assert!(browser.navigations[1].ends_with("Rowley/"));

    // Direct mode never touches the search path
    assert_eq!(diagnostics.attempts.len(), 0);
    assert!(sleeper.slept.is_empty());
}

#[test]
fn search_retry_terminates_after_exactly_max_timeouts() {
    let config = SiteConfig::default();
    let mut browser = MockBrowser::with_rows(Vec::new());
    browser.search_succeeds_on = None; // every wait for results times out
    let mut sleeper = RecordingSleep::default();
    let mut diagnostics = SearchDiagnostics::default();

    let err = resolve_search(
        &config,
        &mut browser,
        &mut sleeper,
        &salisbury_search(),
        &mut diagnostics,
    )
    .unwrap_err();

    let max = config.timeouts.max_timeouts;
    match err {
        TidesError::SearchExhausted { query, timeouts } => {
            assert_eq!(query, "Salisbury, MA");
            assert_eq!(timeouts, max);
        }
        other => panic!("expected SearchExhausted, got {:?}", other),
    }

    // Exactly max_timeouts attempts, with a backoff sleep between attempts
    // (none after the last one)
    assert_eq!(diagnostics.attempts.len(), max as usize);
    assert_eq!(diagnostics.timeouts, max);
    assert_eq!(sleeper.slept.len(), max as usize - 1);

    // Backoff follows the fixed schedule, wrapping after 8 entries, and
    // every delay is attributed to the query that triggered it
    let expected: Vec<(String, u64)> = (0..max as usize - 1)
        .map(|i| ("Salisbury, MA".to_string(), DELAYS_SECS[i % DELAYS_SECS.len()]))
        .collect();
    assert_eq!(diagnostics.sleeps, expected);
    let slept_secs: Vec<u64> = sleeper.slept.iter().map(Duration::as_secs).collect();
    let expected_secs: Vec<u64> = expected.iter().map(|(_, secs)| *secs).collect();
    assert_eq!(slept_secs, expected_secs);
}

#[test]
fn search_succeeds_after_transient_timeouts() {
    let config = SiteConfig::default();
    let mut browser = MockBrowser::with_rows(Vec::new());
    browser.search_succeeds_on = Some(3);
    let mut sleeper = RecordingSleep::default();
    let mut diagnostics = SearchDiagnostics::default();

    resolve_search(
        &config,
        &mut browser,
        &mut sleeper,
        &salisbury_search(),
        &mut diagnostics,
    )
    .unwrap();

    assert_eq!(diagnostics.attempts.len(), 3);
    assert_eq!(diagnostics.timeouts, 2);
    assert_eq!(
        diagnostics.sleeps,
        vec![
            ("Salisbury, MA".to_string(), 2),
            ("Salisbury, MA".to_string(), 4)
        ]
    );
    assert_eq!(browser.typed, vec!["Salisbury, MA"; 3]);

    // The result link was clicked last (after submit clicks)
    assert_eq!(
        browser.clicked.last(),
        Some(&ElementHandle("search-result".to_string()))
    );
}

#[test]
fn rate_limit_notice_is_counted_but_does_not_stop_retrying() {
    let config = SiteConfig::default();
    let mut browser = MockBrowser::with_rows(Vec::new());
    browser.search_succeeds_on = Some(4);
    browser.rate_limit_notice = true;
    let mut sleeper = RecordingSleep::default();
    let mut diagnostics = SearchDiagnostics::default();

    resolve_search(
        &config,
        &mut browser,
        &mut sleeper,
        &salisbury_search(),
        &mut diagnostics,
    )
    .unwrap();

    // Three timeouts, each with the notice present, and the loop kept going
    assert_eq!(diagnostics.timeouts, 3);
    assert_eq!(diagnostics.too_many_searches, 3);
    assert_eq!(diagnostics.attempts.len(), 4);
}

#[test]
fn run_plan_resolves_searches_and_keys_by_query() {
    let config = SiteConfig::default();
    let plan = LocationPlan::Searches(vec![salisbury_search()]);
    let mut browser = MockBrowser::with_rows(week_of_rows(21));
    browser.search_succeeds_on = Some(1);
    let mut sleeper = RecordingSleep::default();
    let mut diagnostics = SearchDiagnostics::default();

    let results = run_plan(
        &config,
        &mut browser,
        &mut sleeper,
        &plan,
        today(),
        &mut diagnostics,
    )
    .unwrap();

    assert_eq!(results.len(), 1);
    let tides = results.get("Salisbury, MA").unwrap();
    assert_eq!(tides.len(), 14);
    assert!(sleeper.slept.is_empty());

    // The search navigated to the base URL, not a location URL
    assert_eq!(browser.navigations, vec![config.site.base_url.clone()]);
}
