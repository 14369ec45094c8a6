//! # car-scout
//!
//! A vehicle listing aggregator for Brazilian classifieds sites.
//!
//! Given a [`SearchSpec`], the crate builds a search URL for each supported
//! site (OLX and WebMotors), renders the results page in a headless
//! browser, extracts the listing cards, and returns the normalized
//! [`VehicleListing`]s that satisfy the search.
//!
//! - One isolated browser session per site, closed on every exit path
//! - Per-source failure isolation: a broken site costs only its own records
//! - Post-hoc filtering, since sites honour search parameters unevenly
//! - An HTTP endpoint (`POST /api/scrape`) for front-ends
//!
//! ## Example
//!
//! Building search URLs and extracting an already rendered results page
//! needs no browser:
//!
//! ```rust
//! use car_scout::{extractor_for, normalize, query_builder, SearchSpec, Site};
//! use rust_decimal::Decimal;
//! use url::Url;
//!
//! # fn main() -> car_scout::Result<()> {
//! let spec = SearchSpec::new()
//!     .with_brand("Fiat")
//!     .with_model("Uno")
//!     .with_max_price(Decimal::from(40000));
//!
//! for query in query_builder::build_all(&spec) {
//!     println!("{}: {}", query.site().display_name(), query.url());
//! }
//!
//! let html = r#"<div data-testid="ad-card">
//!     <a href="/autos-e-pecas/fiat-uno-1"><h2>Fiat Uno Mille</h2></a>
//!     <span data-testid="ad-price">R$ 32.500</span>
//! </div>"#;
//! let base = Url::parse("https://sp.olx.com.br/autos-e-pecas")?;
//! let raw = extractor_for(Site::Olx).extract_cards(html, &base)?;
//! let vehicles = normalize::normalize_and_filter(raw, &spec);
//! assert_eq!(vehicles.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Live searches drive Chrome and need the default `headless` feature; see
//! `ScoutConfig`.

mod error;
mod listing;
mod parse;
mod spec;

pub mod extractors;
pub mod normalize;
pub mod page;
pub mod query_builder;
pub mod search;
pub mod server;

#[cfg(feature = "headless")]
pub mod browser;
#[cfg(feature = "headless")]
pub mod browser_setup;
#[cfg(feature = "headless")]
mod config;

pub use error::{Result, ScoutError};
pub use extractors::{extractor_for, SiteExtractor};
pub use listing::{RawListing, Site, SourceQuery, VehicleListing};
pub use page::{RenderedPage, SessionProvider, StaticPage};
pub use search::{SearchOutcome, SourceReport, VehicleSearch};
pub use spec::SearchSpec;

#[cfg(feature = "headless")]
pub use browser::{BrowserConfig, BrowserSessions};
#[cfg(feature = "headless")]
pub use config::{ScoutConfig, DEFAULT_BIND};
