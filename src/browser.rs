//! # Browser Collaborator Boundary
//!
//! The pipeline depends on an external browser/DOM automation capability; it
//! never implements one. This module defines that boundary: a [`Locator`]
//! for addressing elements, an opaque [`ElementHandle`] the session hands
//! back, the [`Browser`] trait the core code is written against, and the
//! error type the boundary surfaces.
//!
//! The concrete session object is reused across all locations within one
//! run and is not safe for concurrent use; exactly one caller drives it at
//! a time. There is no cancellation: once a wait begins it runs to its
//! timeout.

use std::time::Duration;
use thiserror::Error;

/// How to address an element in the page.
///
/// The site's structure is navigated exclusively by XPath expressions,
/// mirroring the locators carried in the site configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    XPath(String),
}

impl Locator {
    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    /// The underlying expression, for diagnostics.
    pub fn expr(&self) -> &str {
        match self {
            Locator::XPath(expr) => expr,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::XPath(expr) => write!(f, "xpath {}", expr),
        }
    }
}

/// Opaque handle to an element located in the current page. Valid only for
/// the session that produced it, and only until the next navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementHandle(pub String);

/// Errors surfaced by the browser boundary.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// A bounded wait elapsed without the element appearing. This is the
    /// only condition the search-retry loop treats as retryable.
    #[error("timed out after {timeout:?} waiting for {locator}")]
    Timeout { timeout: Duration, locator: String },

    /// The element is not present in the current page.
    #[error("element not found: {0}")]
    NotFound(String),

    /// The session rejected or failed a command (transport failure,
    /// protocol error, stale element, ...).
    #[error("session error: {0}")]
    Session(String),
}

impl BrowserError {
    /// True for the timeout condition, which the search path retries.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::Timeout { .. })
    }
}

/// Blocking browser/DOM automation capability, injected into the pipeline.
///
/// Methods mirror the operations the pipeline needs and nothing more:
/// navigation, bounded waits, element lookup, text extraction, keystrokes
/// and clicks.
pub trait Browser {
    /// Navigate the session to an absolute URL.
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Wait until an element matching the locator is present, up to the
    /// given timeout. Returns [`BrowserError::Timeout`] when it elapses.
    fn wait_for(&mut self, locator: &Locator, timeout: Duration)
        -> Result<ElementHandle, BrowserError>;

    /// All elements currently matching the locator, in document order.
    fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>, BrowserError>;

    /// The rendered text of an element, whitespace as the page shows it.
    fn read_text(&mut self, element: &ElementHandle) -> Result<String, BrowserError>;

    /// Type text into an element (e.g. a search input).
    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<(), BrowserError>;

    /// Click an element.
    fn click(&mut self, element: &ElementHandle) -> Result<(), BrowserError>;
}
