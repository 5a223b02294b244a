//! # Location Plan Loading and Validation
//!
//! The locations input is a JSON file in exactly one of two shapes:
//!
//! ```json
//! {"URLs": [{"URL": "https://www.tideschart.com/Country/State/County/Town/"}]}
//! ```
//!
//! ```json
//! {"SEARCHES": [{"SEARCH": "Salisbury, MA", "HINT": "Essex-County/Salisbury"}]}
//! ```
//!
//! Which top-level key is present decides the operating mode for the whole
//! run. The decision is made once here, at load time, and carried through
//! the pipeline as the tagged [`LocationPlan`] variant; nothing downstream
//! re-inspects raw keys. Every deviation from the documented shape fails
//! before any browser interaction occurs: structural problems (wrong or
//! extra top-level keys) are [`TidesError::InvalidConfiguration`], while a
//! bad entry (URL without the site prefix, empty hint) is
//! [`TidesError::InvalidLocation`].

use crate::config::SiteConfig;
use crate::error::TidesError;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Built-in location list used when the user supplies no input file,
/// in geographic north-to-south order.
pub const DEFAULT_URLS: [&str; 6] = [
    "https://www.tideschart.com/United-States/Massachusetts/Essex-County/Salisbury/",
    "https://www.tideschart.com/United-States/Massachusetts/Essex-County/Newburyport/",
    "https://www.tideschart.com/United-States/Massachusetts/Essex-County/Rowley/",
    "https://www.tideschart.com/United-States/Massachusetts/Essex-County/Crane-Beach/",
    "https://www.tideschart.com/United-States/Massachusetts/Essex-County/Wingaersheek-Beach/",
    "https://www.tideschart.com/United-States/Massachusetts/Essex-County/Rockport/",
];

/// The loaded and validated set of locations, tagged by operating mode.
#[derive(Clone, Debug, PartialEq)]
pub enum LocationPlan {
    /// Navigate straight to per-location URLs; no search interaction.
    Direct(Vec<DirectLocation>),
    /// Resolve each municipality through the site's search box.
    Searches(Vec<SearchLocation>),
}

impl LocationPlan {
    /// Number of locations in the plan, regardless of mode.
    pub fn len(&self) -> usize {
        match self {
            LocationPlan::Direct(urls) => urls.len(),
            LocationPlan::Searches(searches) => searches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A location addressed by a direct weekly-table URL.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectLocation {
    pub url: String,
}

impl DirectLocation {
    /// Result-map key for this location: the URL with the scheme stripped.
    pub fn label(&self) -> String {
        self.url.trim_start_matches("https://").to_string()
    }
}

/// A location addressed by a municipality search plus a disambiguation hint.
///
/// The query is what gets typed into the search box ("TownOrCity, State" or
/// a zip code). The hint is a substring used to pick the right entry from
/// the many results the site tends to present.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchLocation {
    pub query: String,
    pub hint: String,
}

impl SearchLocation {
    /// Result-map key for this location.
    pub fn label(&self) -> &str {
        &self.query
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUrlEntry {
    #[serde(rename = "URL")]
    url: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSearchEntry {
    #[serde(rename = "SEARCH")]
    search: String,
    #[serde(rename = "HINT")]
    hint: String,
}

/// Load and validate a location plan from a JSON file.
pub fn load_plan<P: AsRef<Path>>(path: P, config: &SiteConfig) -> Result<LocationPlan, TidesError> {
    let contents = fs::read_to_string(&path)?;
    parse_plan(&contents, config)
}

/// The default plan used when no input file is given.
pub fn default_plan() -> LocationPlan {
    LocationPlan::Direct(
        DEFAULT_URLS
            .iter()
            .map(|url| DirectLocation {
                url: url.to_string(),
            })
            .collect(),
    )
}

/// Parse and validate location-plan JSON.
///
/// The top level must be an object with exactly one key, either `"URLs"` or
/// `"SEARCHES"`, holding an array of entry objects with exactly the keys for
/// that mode.
pub fn parse_plan(json_text: &str, config: &SiteConfig) -> Result<LocationPlan, TidesError> {
    let root: Value = serde_json::from_str(json_text)
        .map_err(|e| TidesError::InvalidConfiguration(format!("not valid JSON: {}", e)))?;

    let object = root.as_object().ok_or_else(|| {
        TidesError::InvalidConfiguration("top level must be a JSON object".to_string())
    })?;
    if object.len() != 1 {
        return Err(TidesError::InvalidConfiguration(format!(
            "expected exactly one top-level key, found {}",
            object.len()
        )));
    }

    let (key, entries) = object.iter().next().expect("object has one key");
    let entries = entries.as_array().ok_or_else(|| {
        TidesError::InvalidConfiguration(format!("{:?} must hold an array", key))
    })?;

    match key.as_str() {
        "URLs" => {
            let mut urls = Vec::with_capacity(entries.len());
            for entry in entries {
                urls.push(parse_url_entry(entry, config)?);
            }
            Ok(LocationPlan::Direct(urls))
        }
        "SEARCHES" => {
            let mut searches = Vec::with_capacity(entries.len());
            for entry in entries {
                searches.push(parse_search_entry(entry)?);
            }
            Ok(LocationPlan::Searches(searches))
        }
        other => Err(TidesError::InvalidConfiguration(format!(
            "unexpected top-level key {:?}, expected \"URLs\" or \"SEARCHES\"",
            other
        ))),
    }
}

fn parse_url_entry(entry: &Value, config: &SiteConfig) -> Result<DirectLocation, TidesError> {
    let raw: RawUrlEntry =
        serde_json::from_value(entry.clone()).map_err(|e| TidesError::InvalidLocation {
            entry: entry.to_string(),
            reason: e.to_string(),
        })?;

    let required_prefix = format!("{}/", config.site.base_url.trim_end_matches('/'));
    if !raw.url.starts_with(&required_prefix) {
        return Err(TidesError::InvalidLocation {
            entry: raw.url,
            reason: format!("URL does not start with {}", required_prefix),
        });
    }

    Ok(DirectLocation { url: raw.url })
}

fn parse_search_entry(entry: &Value) -> Result<SearchLocation, TidesError> {
    let raw: RawSearchEntry =
        serde_json::from_value(entry.clone()).map_err(|e| TidesError::InvalidLocation {
            entry: entry.to_string(),
            reason: e.to_string(),
        })?;

    if raw.search.trim().is_empty() {
        return Err(TidesError::InvalidLocation {
            entry: entry.to_string(),
            reason: "empty search term".to_string(),
        });
    }
    if raw.hint.trim().is_empty() {
        return Err(TidesError::InvalidLocation {
            entry: entry.to_string(),
            reason: "empty disambiguation hint".to_string(),
        });
    }

    Ok(SearchLocation {
        query: raw.search,
        hint: raw.hint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config() -> SiteConfig {
        SiteConfig::default()
    }

    #[test]
    fn parses_url_plan() {
        let json = r#"{"URLs": [
            {"URL": "https://www.tideschart.com/United-States/Massachusetts/Essex-County/Salisbury/"},
            {"URL": "https://www.tideschart.com/United-States/Massachusetts/Essex-County/Rowley/"}
        ]}"#;
        let plan = parse_plan(json, &config()).unwrap();
        match plan {
            LocationPlan::Direct(urls) => {
                assert_eq!(urls.len(), 2);
                assert!(urls[0].url.ends_with("Salisbury/"));
                assert_eq!(
                    urls[1].label(),
                    "www.tideschart.com/United-States/Massachusetts/Essex-County/Rowley/"
                );
            }
            other => panic!("expected direct plan, got {:?}", other),
        }
    }

    #[test]
    fn parses_search_plan() {
        let json = r#"{"SEARCHES": [
            {"SEARCH": "Salisbury, MA", "HINT": "Essex-County/Salisbury"}
        ]}"#;
        let plan = parse_plan(json, &config()).unwrap();
        match plan {
            LocationPlan::Searches(searches) => {
                assert_eq!(searches.len(), 1);
                assert_eq!(searches[0].query, "Salisbury, MA");
                assert_eq!(searches[0].hint, "Essex-County/Salisbury");
            }
            other => panic!("expected search plan, got {:?}", other),
        }
    }

    #[test]
    fn empty_entry_list_parses_as_empty_plan() {
        let plan = parse_plan(r#"{"URLs": []}"#, &config()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
        let plan = parse_plan(r#"{"SEARCHES": []}"#, &config()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn rejects_unknown_top_level_key() {
        let json = r#"{"LOCATIONS": []}"#;
        let err = parse_plan(json, &config()).unwrap_err();
        assert!(matches!(err, TidesError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_two_top_level_keys() {
        let json = r#"{"URLs": [], "SEARCHES": []}"#;
        let err = parse_plan(json, &config()).unwrap_err();
        assert!(matches!(err, TidesError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_non_array_value() {
        let json = r#"{"URLs": "not-a-list"}"#;
        let err = parse_plan(json, &config()).unwrap_err();
        assert!(matches!(err, TidesError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_plan("{not json", &config()).unwrap_err();
        assert!(matches!(err, TidesError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_url_with_wrong_host() {
        let json = r#"{"URLs": [{"URL": "http://not-the-site.com/x"}]}"#;
        let err = parse_plan(json, &config()).unwrap_err();
        assert!(matches!(err, TidesError::InvalidLocation { .. }));
    }

    #[test]
    fn rejects_url_entry_with_extra_keys() {
        let json = r#"{"URLs": [{"URL": "https://www.tideschart.com/x/", "NOTE": "hi"}]}"#;
        let err = parse_plan(json, &config()).unwrap_err();
        assert!(matches!(err, TidesError::InvalidLocation { .. }));
    }

    #[test]
    fn rejects_search_entry_missing_hint() {
        let json = r#"{"SEARCHES": [{"SEARCH": "Salisbury, MA"}]}"#;
        let err = parse_plan(json, &config()).unwrap_err();
        assert!(matches!(err, TidesError::InvalidLocation { .. }));
    }

    #[test]
    fn rejects_empty_hint() {
        let json = r#"{"SEARCHES": [{"SEARCH": "Salisbury, MA", "HINT": "  "}]}"#;
        let err = parse_plan(json, &config()).unwrap_err();
        match err {
            TidesError::InvalidLocation { reason, .. } => {
                assert!(reason.contains("hint"));
            }
            other => panic!("expected InvalidLocation, got {:?}", other),
        }
    }

    #[test]
    fn default_plan_is_valid_for_default_config() {
        let plan = default_plan();
        assert_eq!(plan.len(), 6);
        // Every built-in URL passes the same validation as user input
        let json = serde_json::json!({
            "URLs": DEFAULT_URLS.iter().map(|u| serde_json::json!({"URL": u})).collect::<Vec<_>>()
        });
        assert!(parse_plan(&json.to_string(), &config()).is_ok());
    }

    #[test]
    fn loads_plan_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"URLs": [{{"URL": "https://www.tideschart.com/United-States/Maine/Cumberland-County/Portland/"}}]}}"#
        )
        .unwrap();
        let plan = load_plan(file.path(), &config()).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_plan("/nonexistent/locations.json", &config()).unwrap_err();
        assert!(matches!(err, TidesError::Io(_)));
    }
}
