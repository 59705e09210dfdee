//! Worker pool for running many queries at once
//!
//! This module handles:
//! - Submitting every query up front as its own task
//! - Global concurrency limiting via a semaphore
//! - Waiting until every task has reached a terminal state
//! - Containing worker panics so siblings keep running

use crate::harvest::fetcher::PageFetcher;
use crate::harvest::worker::{QueryOutcome, QueryWorker};
use crate::state::{Progress, Query};
use crate::HarvestError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Bounded pool of query workers
pub struct Scheduler {
    /// Global semaphore for limiting concurrent queries
    semaphore: Arc<Semaphore>,

    /// Number of queries allowed in flight
    capacity: usize,
}

impl Scheduler {
    /// Creates a pool running at most `min(capacity, query_count)` queries at once
    pub fn new(capacity: usize, query_count: usize) -> Self {
        let capacity = capacity.min(query_count).max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Runs every query to completion
    ///
    /// Returns the outcomes in query order. A panicking worker is logged and
    /// left out of the outcomes; it never stops the others. Only a closed
    /// semaphore, which means the pool itself is broken, fails the run.
    pub async fn run_all<F: PageFetcher>(
        &self,
        worker: Arc<QueryWorker<F>>,
        queries: Vec<Query>,
        progress: Arc<Progress>,
    ) -> Result<Vec<QueryOutcome>, HarvestError> {
        let mut tasks = JoinSet::new();

        for query in queries {
            let semaphore = Arc::clone(&self.semaphore);
            let worker = Arc::clone(&worker);
            let progress = Arc::clone(&progress);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| HarvestError::Pool(e.to_string()))?;

                tracing::info!(
                    "[{}/{}] Query: {}",
                    query.id + 1,
                    progress.total(),
                    query.text
                );
                let outcome = worker.run(query).await;

                let done = progress.finish(outcome.is_failed());
                tracing::info!(
                    "Finished {}/{} queries ('{}': {} pages, {} new domains)",
                    done,
                    progress.total(),
                    outcome.query.text,
                    outcome.pages_fetched,
                    outcome.accepted
                );
                Ok::<_, HarvestError>(outcome)
            });
        }

        let mut outcomes = Vec::new();
        let mut pool_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(e)) => {
                    tracing::error!("Worker pool failure: {}", e);
                    pool_error.get_or_insert(e);
                }
                Err(e) => {
                    // The task died before reporting, so count it here
                    let done = progress.finish(true);
                    tracing::error!(
                        "Finished {}/{} queries (worker panicked: {})",
                        done,
                        progress.total(),
                        e
                    );
                }
            }
        }

        if let Some(e) = pool_error {
            return Err(e);
        }

        outcomes.sort_by_key(|outcome| outcome.query.id);
        Ok(outcomes)
    }
}
