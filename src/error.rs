//! Error types for the extraction pipeline.

use thiserror::Error;

use crate::Site;

/// Result type alias for scout operations.
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Errors that can occur while building queries, driving the browser,
/// or extracting listings.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Missing or invalid search configuration at the request boundary.
    #[error("Invalid search configuration: {0}")]
    Configuration(String),

    /// A single site's search URL could not be built.
    #[error("Failed to build {site} query: {reason}")]
    QueryBuild { site: Site, reason: String },

    /// The page did not finish loading before the navigation deadline.
    #[error("Navigation to {url} timed out after {secs}s")]
    NavigationTimeout { url: String, secs: u64 },

    /// The listing card selector never appeared on the rendered page.
    #[error("Selector '{selector}' not found within {secs}s")]
    SelectorNotFound { selector: String, secs: u64 },

    /// One listing card could not be converted into a record.
    #[error("Card extraction failed: {0}")]
    CardExtraction(String),

    /// Browser launch, tab or CDP failure.
    #[error("Browser error: {0}")]
    Browser(String),

    /// Failed to parse a selector or page markup.
    #[error("Failed to parse page: {0}")]
    Parse(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Failure that escaped every per-source boundary.
    #[error("Internal error: {0}")]
    Internal(String),
}
