//! # Tidesapp Entry Point
//!
//! Command-line front end for the weekly tide retrieval pipeline. Parses the
//! single optional `-f`/`--file` flag, loads the site configuration and the
//! location plan, starts a WebDriver-backed browser session and runs the
//! pipeline, printing each location's high tides for the upcoming week.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::{bail, Context};
use chrono::Local;
use std::env;
use std::path::Path;
use tidesapp_lib::backoff::ThreadSleep;
use tidesapp_lib::config::SiteConfig;
use tidesapp_lib::resolver::SearchDiagnostics;
use tidesapp_lib::webdriver::WebDriverBrowser;
use tidesapp_lib::{locations, retriever};

/// Parse the command line: a single optional `-f`/`--file` flag naming the
/// locations JSON file. Returns `None` when no file was given.
fn parse_file_arg() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-f" | "--file" => match iter.next() {
                Some(path) => return Ok(Some(path.clone())),
                None => bail!("{} requires a file path", arg),
            },
            other => {
                if let Some(path) = other.strip_prefix("--file=") {
                    return Ok(Some(path.to_string()));
                }
                bail!("unrecognized argument: {}", other);
            }
        }
    }
    Ok(None)
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let file = parse_file_arg()?;
    let config = SiteConfig::load();

    let plan = match &file {
        Some(path) => {
            if !Path::new(path).is_file() {
                bail!("{} does not exist or is not a file", path);
            }
            locations::load_plan(path, &config)
                .with_context(|| format!("loading locations from {}", path))?
        }
        None => {
            eprintln!("No locations file given, using the built-in location list");
            locations::default_plan()
        }
    };
    if plan.is_empty() {
        eprintln!("Warning: locations file contains no entries; nothing to retrieve");
    }
    eprintln!("Loaded {} location(s)", plan.len());

    let mut browser = WebDriverBrowser::new(&config.site.webdriver_url, config.poll_interval())
        .with_context(|| format!("starting WebDriver session at {}", config.site.webdriver_url))?;
    let mut sleeper = ThreadSleep;
    let mut diagnostics = SearchDiagnostics::default();
    let today = Local::now().date_naive();

    let results = retriever::run_plan(
        &config,
        &mut browser,
        &mut sleeper,
        &plan,
        today,
        &mut diagnostics,
    )?;

    for (location, tides) in &results {
        println!("{}", location);
        for tide in tides {
            println!("  high tide at {}", tide.format("%Y-%m-%d %l:%M%P"));
        }
    }

    if diagnostics.timeouts > 0 {
        eprintln!(
            "Search diagnostics: {} attempt(s), {} timeout(s), {} rate-limit notice(s)",
            diagnostics.attempts.len(),
            diagnostics.timeouts,
            diagnostics.too_many_searches
        );
    }

    Ok(())
}
