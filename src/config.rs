//! Runtime configuration.

use std::sync::Arc;

use crate::browser::{BrowserConfig, BrowserSessions};
use crate::search::VehicleSearch;

/// Default listen address for the HTTP endpoint.
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Everything needed to run searches against live sites.
///
/// ```rust,no_run
/// use car_scout::{ScoutConfig, SearchSpec};
/// use rust_decimal::Decimal;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let search = ScoutConfig::default().build_search();
///
///     let spec = SearchSpec::new()
///         .with_brand("Fiat")
///         .with_model("Uno")
///         .with_max_price(Decimal::from(40000));
///     let outcome = search.run(&spec).await?;
///
///     for vehicle in &outcome.vehicles {
///         println!("{}: {}", vehicle.title, vehicle.listing_url);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub browser: BrowserConfig,
    /// Upper bound on simultaneously open browser sessions.
    pub max_concurrent_sessions: usize,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            max_concurrent_sessions: 1,
        }
    }
}

impl ScoutConfig {
    /// Builds a search backed by real browser sessions.
    pub fn build_search(&self) -> VehicleSearch {
        VehicleSearch::new(Arc::new(BrowserSessions::new(self.browser.clone())))
            .with_max_concurrent_sessions(self.max_concurrent_sessions)
    }
}
