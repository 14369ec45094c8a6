//! Extraction orchestration.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::extractors::extractor_for;
use crate::normalize::normalize_and_filter;
use crate::page::SessionProvider;
use crate::query_builder;
use crate::{RawListing, Result, ScoutError, SearchSpec, Site, SourceQuery, VehicleListing};

/// Outcome of extracting one source.
#[derive(Debug)]
pub struct SourceReport {
    pub site: Site,
    pub url: Url,
    pub result: Result<Vec<RawListing>>,
}

impl SourceReport {
    /// Number of raw records the source produced; zero on failure.
    pub fn record_count(&self) -> usize {
        self.result.as_ref().map_or(0, Vec::len)
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Filtered listings together with how each source fared.
#[derive(Debug)]
pub struct SearchOutcome {
    pub vehicles: Vec<VehicleListing>,
    pub sources: Vec<SourceReport>,
    pub duration_ms: u64,
}

impl SearchOutcome {
    /// Number of listings that survived normalization and filtering.
    pub fn total(&self) -> usize {
        self.vehicles.len()
    }

    /// Reports for sources that yielded nothing because of an error.
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|report| !report.is_success())
    }
}

/// Runs a [`SearchSpec`] against every supported site.
///
/// Sources are extracted as independent tasks. A failing source only
/// loses its own records; the others still contribute.
pub struct VehicleSearch {
    sessions: Arc<dyn SessionProvider>,
    max_concurrent_sessions: usize,
}

impl VehicleSearch {
    /// Creates a search over the given session provider, one session at a time.
    pub fn new(sessions: Arc<dyn SessionProvider>) -> Self {
        Self {
            sessions,
            max_concurrent_sessions: 1,
        }
    }

    /// Allows up to `limit` browser sessions to be open at once (at least one).
    pub fn with_max_concurrent_sessions(mut self, limit: usize) -> Self {
        self.max_concurrent_sessions = limit.max(1);
        self
    }

    pub fn max_concurrent_sessions(&self) -> usize {
        self.max_concurrent_sessions
    }

    /// Builds every site's query for `spec`, extracts them, and filters the result.
    ///
    /// Only fails when a source task dies outright; source-level errors are
    /// reported in [`SearchOutcome::sources`].
    pub async fn run(&self, spec: &SearchSpec) -> Result<SearchOutcome> {
        let queries = query_builder::build_all(spec);
        self.run_queries(queries, spec).await
    }

    /// Extracts the given queries and filters the combined records by `spec`.
    pub async fn run_queries(
        &self,
        queries: Vec<SourceQuery>,
        spec: &SearchSpec,
    ) -> Result<SearchOutcome> {
        let start = Instant::now();
        debug!(
            "Extracting {} sources, {} at a time",
            queries.len(),
            self.max_concurrent_sessions
        );

        let permits = Arc::new(Semaphore::new(self.max_concurrent_sessions));
        let mut tasks = JoinSet::new();

        for (idx, query) in queries.into_iter().enumerate() {
            let sessions = Arc::clone(&self.sessions);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                // Semaphore is never closed while tasks are alive.
                let _permit = permits.acquire_owned().await.ok();
                (idx, extract_source(sessions.as_ref(), query).await)
            });
        }

        let mut sources: Vec<(usize, SourceReport)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => sources.push(entry),
                Err(e) => {
                    tasks.abort_all();
                    return Err(ScoutError::Internal(format!("Source task failed: {}", e)));
                }
            }
        }
        sources.sort_by_key(|(idx, _)| *idx);
        let sources: Vec<SourceReport> = sources.into_iter().map(|(_, report)| report).collect();

        let raw: Vec<RawListing> = sources
            .iter()
            .filter_map(|report| report.result.as_ref().ok())
            .flatten()
            .cloned()
            .collect();
        let raw_count = raw.len();
        let vehicles = normalize_and_filter(raw, spec);

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            count = vehicles.len(),
            raw = raw_count,
            duration_ms,
            "Search finished"
        );

        Ok(SearchOutcome {
            vehicles,
            sources,
            duration_ms,
        })
    }
}

async fn extract_source(sessions: &dyn SessionProvider, query: SourceQuery) -> SourceReport {
    let site = query.site();
    let url = query.url().clone();

    let result = sessions.extract(&url, extractor_for(site)).await;
    match &result {
        Ok(records) => info!(site = %site, count = records.len(), "Source finished"),
        Err(e) => warn!(site = %site, url = %url, "Source failed: {}", e),
    }

    SourceReport { site, url, result }
}
