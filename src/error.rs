//! # Error Taxonomy
//!
//! One error enum covers the whole retrieval pipeline, from locations-file
//! validation to table parsing. Each variant carries the offending raw text,
//! URL, or configuration fragment, since most failures happen against a live,
//! uncontrolled external page structure and the context is what makes them
//! debuggable.
//!
//! Retries apply only to the search-timeout condition in the location
//! resolver. Parse and shape errors indicate a structural mismatch that
//! retrying cannot fix, so they propagate immediately.

use crate::browser::BrowserError;
use std::io;
use thiserror::Error;

/// Errors that can occur while loading locations, resolving them, and
/// retrieving weekly tide data.
#[derive(Error, Debug)]
pub enum TidesError {
    /// Locations file is malformed or incomplete (wrong keys, wrong
    /// cardinality). Fatal, surfaced before any browser interaction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A location entry failed validation (URL without the required site
    /// prefix, or a search entry with an empty hint). Aborts the run.
    #[error("invalid location {entry:?}: {reason}")]
    InvalidLocation { entry: String, reason: String },

    /// The weekly table did not contain exactly 7 rows. Fatal for that
    /// location; indicates a page layout change.
    #[error("expected 7 rows in weekly table at {location}, found {found}")]
    UnexpectedTableShape { location: String, found: usize },

    /// A row's text did not match the expected grammar, or produced an
    /// out-of-range count of high tides (0 or 3+). Not retried.
    #[error("malformed row {text:?}: {reason}")]
    MalformedRow { text: String, reason: String },

    /// Retry budget exceeded while resolving a municipality search.
    #[error("search for {query:?} exhausted after {timeouts} timeouts")]
    SearchExhausted { query: String, timeouts: u32 },

    /// Browser/DOM automation failure (navigation, element lookup, ...)
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Locations file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
