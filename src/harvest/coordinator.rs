//! Harvest coordinator - one session from query list to output tables
//!
//! A session:
//! - Creates a fresh aggregator, progress tracker, and session id
//! - Submits every query to the worker pool
//! - Waits for every worker to stop
//! - Drains the aggregator and writes both tables
//!
//! Nothing is read from the aggregator until the pool has fully drained, and
//! no state outlives the session.

use crate::config::{validate, Config};
use crate::harvest::fetcher::{PageFetcher, SearchClient};
use crate::harvest::rate_limit::RateLimiter;
use crate::harvest::scheduler::Scheduler;
use crate::harvest::worker::{QueryOutcome, QueryWorker, WorkerSettings};
use crate::output::{write_page_report, write_results, HarvestStatistics, WriteOutcome};
use crate::state::{Aggregator, Harvest, Progress, Query};
use crate::HarvestError;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// What a finished session hands back to its caller
#[derive(Debug, Clone)]
pub struct HarvestOutcome {
    pub session_id: String,
    pub record_count: usize,
    /// The deduplicated result table, or `Empty` when nothing was accepted
    pub results: WriteOutcome,
    /// The per-query page-count table
    pub diagnostics: WriteOutcome,
    pub statistics: HarvestStatistics,
}

/// Drained state of a session whose tables have not been written
#[derive(Debug)]
pub struct SessionReport {
    pub harvest: Harvest,
    pub outcomes: Vec<QueryOutcome>,
    pub statistics: HarvestStatistics,
}

/// Main harvest coordinator structure
pub struct Coordinator<F> {
    config: Arc<Config>,
    fetcher: Arc<F>,
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a coordinator around any page fetcher
    ///
    /// The configuration is validated here, so a hand-built `Config` gets the
    /// same checks as one loaded from a file.
    pub fn new(config: Config, fetcher: F) -> Result<Self, HarvestError> {
        validate(&config)?;
        Ok(Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
        })
    }

    /// Runs every query to completion and returns the drained session state
    ///
    /// Per-query failures are contained and only show up in the outcomes and
    /// statistics.
    pub async fn harvest(&self, queries: Vec<String>) -> Result<SessionReport, HarvestError> {
        if queries.is_empty() {
            return Err(HarvestError::NoQueries);
        }

        let started_at = Utc::now();
        let clock = Instant::now();
        let queries = Query::from_list(queries);
        tracing::info!("Starting harvest for {} queries", queries.len());

        let aggregator = Arc::new(Aggregator::new(&queries));
        let progress = Arc::new(Progress::new(queries.len()));
        let limiter = RateLimiter::from_config(self.config.rate_limit.as_ref()).map(Arc::new);
        let worker = Arc::new(QueryWorker::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&aggregator),
            limiter,
            WorkerSettings {
                empty_page_threshold: self.config.harvest.empty_page_threshold,
                max_pages: self.config.harvest.max_pages,
            },
        ));

        let scheduler = Scheduler::new(self.config.harvest.max_concurrent_queries, queries.len());
        tracing::debug!("Running up to {} queries at once", scheduler.capacity());

        let outcomes = scheduler
            .run_all(worker, queries, Arc::clone(&progress))
            .await?;

        let harvest = aggregator.drain().await;
        let statistics = HarvestStatistics::collect(
            &harvest,
            &outcomes,
            progress.total(),
            started_at,
            clock.elapsed(),
        );

        tracing::info!(
            "Harvest finished: {} unique domains from {} queries ({} failed) in {:?}",
            harvest.records.len(),
            statistics.queries,
            statistics.failed_queries,
            statistics.duration
        );

        Ok(SessionReport {
            harvest,
            outcomes,
            statistics,
        })
    }

    /// Runs one full session and writes its tables to the output directory
    ///
    /// # Example
    ///
    /// ```no_run
    /// use serp_harvester::config::load_config;
    /// use serp_harvester::harvest::{Coordinator, SearchClient};
    /// use std::path::Path;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config(Path::new("harvester.toml"))?;
    /// let client = SearchClient::new(&config.search, &config.user_agent, "secret")?;
    /// let outcome = Coordinator::new(config, client)?
    ///     .run(vec!["coffee roasters".to_string()])
    ///     .await?;
    /// println!("{} unique domains", outcome.record_count);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, queries: Vec<String>) -> Result<HarvestOutcome, HarvestError> {
        let session_id = Uuid::new_v4().to_string();
        self.run_session(&session_id, queries).await
    }

    /// Runs one full session under a caller-chosen session id
    pub async fn run_session(
        &self,
        session_id: &str,
        queries: Vec<String>,
    ) -> Result<HarvestOutcome, HarvestError> {
        let report = self.harvest(queries).await?;
        let directory = Path::new(&self.config.output.directory);

        let results = write_results(directory, session_id, &report.harvest)?;
        let diagnostics = write_page_report(directory, session_id, &report.harvest.pages)?;

        match &results {
            WriteOutcome::Written { path, row_count } => {
                tracing::info!("Wrote {} unique domains to {}", row_count, path.display())
            }
            WriteOutcome::Empty => tracing::info!("No records accepted; result table not written"),
        }

        Ok(HarvestOutcome {
            session_id: session_id.to_string(),
            record_count: report.harvest.records.len(),
            results,
            diagnostics,
            statistics: report.statistics,
        })
    }
}

/// Runs a complete harvest against the configured search API
///
/// This is the main entry point. It builds the HTTP search client for the
/// given API key and runs one session over the queries.
///
/// # Returns
///
/// * `Ok(HarvestOutcome)` - Every query reached a terminal state
/// * `Err(HarvestError)` - The run could not start, the pool broke, or output failed
pub async fn run(
    config: Config,
    queries: Vec<String>,
    api_key: &str,
) -> Result<HarvestOutcome, HarvestError> {
    let client = SearchClient::new(&config.search, &config.user_agent, api_key)?;
    Coordinator::new(config, client)?.run(queries).await
}
