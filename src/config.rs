//! # Site Configuration
//!
//! This module handles loading and parsing configuration from the
//! tidesapp-config.toml file. It centralizes everything that used to be
//! scattered constants: the fixed site URL, the XPath locators for the
//! search box and the weekly table, wait durations, and the search retry
//! limit. The resolved value is immutable and injected into the location
//! resolver and weekly retriever at construction time; there is no
//! process-wide mutable state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Application configuration loaded from tidesapp-config.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Target site and WebDriver endpoint
    pub site: SiteSection,
    /// Wait durations and retry limits
    pub timeouts: TimeoutConfig,
    /// XPath locators for navigating the site
    pub locators: LocatorConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteSection {
    /// Base URL of the tide-chart site; every direct location URL must
    /// start with this prefix
    pub base_url: String,
    /// WebDriver endpoint driving the browser session (e.g. chromedriver)
    pub webdriver_url: String,
}

/// Wait durations and retry limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeoutConfig {
    /// Short wait used when probing for search results
    pub quick_wait_secs: u64,
    /// Long wait used for page and table readiness
    pub long_wait_secs: u64,
    /// Polling interval for element waits, in milliseconds
    pub poll_interval_ms: u64,
    /// Maximum number of timeout events tolerated by the search-retry loop
    pub max_timeouts: u32,
}

/// XPath locators for navigating the site.
///
/// `search_results` is a template: the literal text `HINT` is replaced with
/// a location's disambiguation hint before use.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocatorConfig {
    /// Search input field on the landing page
    pub searchbox_input: String,
    /// Search submit button
    pub searchbox_submit: String,
    /// Rate-limit notice shown after too many searches
    pub too_many_searches: String,
    /// Search-result link template, with a `HINT` placeholder
    pub search_results: String,
    /// Rows of the weekly tide table
    pub weekly_table_rows: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site: SiteSection {
                base_url: "https://www.tideschart.com".to_string(),
                webdriver_url: "http://localhost:9515".to_string(),
            },
            timeouts: TimeoutConfig {
                quick_wait_secs: 5,
                long_wait_secs: 30,
                poll_interval_ms: 500,
                max_timeouts: 10,
            },
            locators: LocatorConfig {
                searchbox_input: r#"//form[@class="app-search"]//input[@id="searchInput"]"#
                    .to_string(),
                searchbox_submit: r#"//form[@class="app-search"]//button[@type="submit"]"#
                    .to_string(),
                too_many_searches: r#"//*[contains(text(), "Too many search requests")]"#
                    .to_string(),
                search_results: concat!(
                    r#"//div[@class="search-item"]//*[contains(text(),"HINT")]"#,
                    r#"/parent::div[@class="search-item"]//a"#
                )
                .to_string(),
                weekly_table_rows: concat!(
                    r#"//table/child::caption[contains(text(),"Tide table for")"#,
                    r#" and contains(text(), "this week")]/../tbody/tr"#
                )
                .to_string(),
            },
        }
    }
}

impl SiteConfig {
    /// Load configuration from tidesapp-config.toml in the working directory.
    /// Falls back to the default configuration if the file doesn't exist or
    /// is invalid.
    pub fn load() -> Self {
        Self::load_from_path("tidesapp-config.toml")
    }

    /// Load configuration from the specified path, falling back to defaults
    /// on a missing or invalid file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<SiteConfig>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Invalid config file format: {}", e);
                    eprintln!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Short wait used when probing for search results.
    pub fn quick_wait(&self) -> Duration {
        Duration::from_secs(self.timeouts.quick_wait_secs)
    }

    /// Long wait used for page and table readiness.
    pub fn long_wait(&self) -> Duration {
        Duration::from_secs(self.timeouts.long_wait_secs)
    }

    /// Polling interval for element waits.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.timeouts.poll_interval_ms)
    }
}
