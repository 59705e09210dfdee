//! Query worker: pagination for a single query
//!
//! A worker fetches page 1, 2, 3, ... of one query until one of:
//! - a page fetch fails (the rest of the query is abandoned)
//! - the configured number of consecutive empty pages is reached
//! - the page ceiling is reached
//!
//! Page N+1 is never requested before page N has been fully admitted.

use crate::harvest::fetcher::{FetchError, PageFetcher};
use crate::harvest::rate_limit::RateLimiter;
use crate::state::{Admission, Aggregator, Query};
use std::sync::Arc;

/// Per-query termination settings
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    /// Consecutive empty pages that end a query (at least 1)
    pub empty_page_threshold: u32,
    /// Last page number a query may fetch
    pub max_pages: u32,
}

/// Why a query stopped paginating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Enough consecutive empty pages were seen
    Exhausted,
    /// The page ceiling was reached
    PageLimit,
    /// A page fetch failed; later pages were never requested
    Failed { page: u32, error: FetchError },
}

/// Summary of one finished query
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub query: Query,
    /// Pages fetched successfully
    pub pages_fetched: u32,
    /// Raw results across those pages
    pub results_seen: usize,
    /// Results that became new records
    pub accepted: usize,
    pub stop: StopReason,
}

impl QueryOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.stop, StopReason::Failed { .. })
    }
}

/// Drives the page fetcher for one query at a time
pub struct QueryWorker<F> {
    fetcher: Arc<F>,
    aggregator: Arc<Aggregator>,
    limiter: Option<Arc<RateLimiter>>,
    settings: WorkerSettings,
}

impl<F: PageFetcher> QueryWorker<F> {
    pub fn new(
        fetcher: Arc<F>,
        aggregator: Arc<Aggregator>,
        limiter: Option<Arc<RateLimiter>>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            fetcher,
            aggregator,
            limiter,
            settings,
        }
    }

    /// Paginates one query to a terminal state
    ///
    /// Never fails: fetch errors end this query and are reported in the
    /// returned outcome.
    pub async fn run(&self, query: Query) -> QueryOutcome {
        let threshold = self.settings.empty_page_threshold.max(1);
        let mut outcome = QueryOutcome {
            query,
            pages_fetched: 0,
            results_seen: 0,
            accepted: 0,
            stop: StopReason::Exhausted,
        };
        let mut page = 1;
        let mut empty_streak = 0;

        loop {
            if let Some(limiter) = &self.limiter {
                limiter.acquire().await;
            }
            let fetched = self.fetcher.fetch(&outcome.query, page).await;
            if let Some(limiter) = &self.limiter {
                limiter.complete().await;
            }

            let results = match fetched {
                Ok(results) => results,
                Err(error) => {
                    tracing::warn!(
                        "Error on page {} of query '{}': {}",
                        page,
                        outcome.query.text,
                        error
                    );
                    outcome.stop = StopReason::Failed { page, error };
                    return outcome;
                }
            };

            outcome.pages_fetched += 1;
            outcome.results_seen += results.len();
            self.aggregator
                .record_page(outcome.query.id, page, results.len())
                .await;

            if results.is_empty() {
                empty_streak += 1;
                tracing::debug!(
                    "Page {} of query '{}' was empty ({}/{})",
                    page,
                    outcome.query.text,
                    empty_streak,
                    threshold
                );
                if empty_streak >= threshold {
                    outcome.stop = StopReason::Exhausted;
                    return outcome;
                }
            } else {
                empty_streak = 0;
                let raw = results.len();
                let mut new_domains = 0;
                for result in results {
                    match self.aggregator.try_admit(result).await {
                        Admission::Accepted(_) => new_domains += 1,
                        Admission::Duplicate(_) => {}
                        Admission::Unresolvable(e) => tracing::debug!(
                            "Skipping result on page {} of query '{}': {}",
                            page,
                            outcome.query.text,
                            e
                        ),
                    }
                }
                outcome.accepted += new_domains;
                tracing::debug!(
                    "Page {} of query '{}' returned {} results, {} new domains",
                    page,
                    outcome.query.text,
                    raw,
                    new_domains
                );
            }

            if page >= self.settings.max_pages {
                tracing::info!(
                    "Query '{}' reached the page limit of {}",
                    outcome.query.text,
                    self.settings.max_pages
                );
                outcome.stop = StopReason::PageLimit;
                return outcome;
            }
            page += 1;
        }
    }
}
