//! # Location Resolution via the Search Box
//!
//! Direct-URL locations are fully validated at load time and need no
//! resolution. Municipality searches are resolved here: the query is typed
//! into the site's search box and a result link matching the location's hint
//! is awaited, then clicked, leaving the browser session on the location's
//! weekly-table page.
//!
//! The site throttles rapid repeated searches, so a short timeout while
//! waiting for the result link triggers a backoff-and-retry loop. The loop
//! terminates successfully on the first match, or fails with
//! [`TidesError::SearchExhausted`] once the timeout count reaches the
//! configured maximum. Only the timeout condition is retried; every other
//! browser failure propagates immediately.

use crate::backoff::{self, Sleep};
use crate::browser::{Browser, Locator};
use crate::config::SiteConfig;
use crate::error::TidesError;
use crate::locations::SearchLocation;
use std::time::Duration;

/// Counters and traces accumulated while resolving searches. Purely
/// diagnostic; nothing in the retry loop branches on these.
#[derive(Debug, Default)]
pub struct SearchDiagnostics {
    /// Total search-result timeouts observed across the run
    pub timeouts: u32,
    /// Times the "Too many search requests" notice was seen after a timeout.
    /// Tracked but never consulted to change retry behavior.
    pub too_many_searches: u32,
    /// Query submitted on each attempt, in order
    pub attempts: Vec<String>,
    /// Query and backoff delay (seconds) applied after each timed-out
    /// attempt, so delays stay attributable in a multi-search run
    pub sleeps: Vec<(String, u64)>,
}

/// Resolve one municipality search. On success the browser has navigated to
/// the location's page via the clicked search result.
pub fn resolve_search(
    config: &SiteConfig,
    browser: &mut dyn Browser,
    sleeper: &mut dyn Sleep,
    search: &SearchLocation,
    diagnostics: &mut SearchDiagnostics,
) -> Result<(), TidesError> {
    let input_locator = Locator::xpath(config.locators.searchbox_input.clone());
    let submit_locator = Locator::xpath(config.locators.searchbox_submit.clone());
    let notice_locator = Locator::xpath(config.locators.too_many_searches.clone());
    let results_locator =
        Locator::xpath(config.locators.search_results.replace("HINT", &search.hint));

    let mut timeouts: u32 = 0;
    loop {
        browser.navigate(&config.site.base_url)?;
        let input = browser.wait_for(&input_locator, config.long_wait())?;
        browser.send_keys(&input, &search.query)?;
        let submit = browser.wait_for(&submit_locator, config.long_wait())?;
        browser.click(&submit)?;
        diagnostics.attempts.push(search.query.clone());

        match browser.wait_for(&results_locator, config.quick_wait()) {
            Ok(result) => {
                browser.click(&result)?;
                return Ok(());
            }
            Err(err) if err.is_timeout() => {
                timeouts += 1;
                diagnostics.timeouts += 1;

                // Probe for the rate-limit notice. The count is recorded for
                // post-run inspection only; the loop never branches on it.
                if browser
                    .wait_for(&notice_locator, config.quick_wait())
                    .is_ok()
                {
                    diagnostics.too_many_searches += 1;
                }

                if timeouts >= config.timeouts.max_timeouts {
                    return Err(TidesError::SearchExhausted {
                        query: search.query.clone(),
                        timeouts,
                    });
                }

                let delay = backoff::delay_secs((timeouts - 1) as usize);
                diagnostics.sleeps.push((search.query.clone(), delay));
                sleeper.sleep(Duration::from_secs(delay));
            }
            Err(err) => return Err(err.into()),
        }
    }
}
