//! Statistics for a finished harvest session
//!
//! This module provides functionality for summarizing a drained session
//! and displaying that summary.

use crate::harvest::{FetchError, QueryOutcome, StopReason};
use crate::state::Harvest;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Wall time from submission until every worker finished
    pub duration: Duration,

    /// Number of queries submitted
    pub queries: usize,

    /// Queries that ran out of results
    pub exhausted_queries: usize,

    /// Queries stopped by the page ceiling
    pub page_limited_queries: usize,

    /// Queries abandoned after a failed page, including panicked workers
    pub failed_queries: usize,

    /// Failed queries by failure kind
    pub failures: BTreeMap<String, usize>,

    /// Pages fetched successfully across all queries
    pub pages_fetched: usize,

    /// Raw results across those pages, before dedup
    pub raw_results: usize,

    /// Unique domains accepted
    pub records: usize,

    /// Number of output columns
    pub fields: usize,
}

impl HarvestStatistics {
    /// Summarizes a drained session
    ///
    /// `submitted` is the number of queries handed to the pool. Queries with
    /// no outcome (their worker panicked) count as failed.
    pub fn collect(
        harvest: &Harvest,
        outcomes: &[QueryOutcome],
        submitted: usize,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        let mut exhausted_queries = 0;
        let mut page_limited_queries = 0;
        let mut failures: BTreeMap<String, usize> = BTreeMap::new();

        for outcome in outcomes {
            match &outcome.stop {
                StopReason::Exhausted => exhausted_queries += 1,
                StopReason::PageLimit => page_limited_queries += 1,
                StopReason::Failed { error, .. } => {
                    *failures.entry(failure_kind(error)).or_default() += 1;
                }
            }
        }

        let panicked = submitted.saturating_sub(outcomes.len());
        if panicked > 0 {
            failures.insert("worker panic".to_string(), panicked);
        }

        Self {
            started_at,
            duration,
            queries: submitted,
            exhausted_queries,
            page_limited_queries,
            failed_queries: failures.values().sum(),
            failures,
            pages_fetched: harvest.pages.pages_fetched(),
            raw_results: harvest.pages.raw_results(),
            records: harvest.records.len(),
            fields: harvest.fields.len(),
        }
    }

    /// Share of raw results that became records, in percent
    pub fn yield_rate(&self) -> f64 {
        if self.raw_results > 0 {
            (self.records as f64 / self.raw_results as f64) * 100.0
        } else {
            0.0
        }
    }
}

fn failure_kind(error: &FetchError) -> String {
    match error {
        FetchError::Network(_) => "network".to_string(),
        FetchError::HttpStatus { status } => format!("HTTP {}", status),
        FetchError::MalformedResponse(_) => "malformed response".to_string(),
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Duration: {:.1}s", stats.duration.as_secs_f64());
    println!("  Queries: {}", stats.queries);
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Raw results: {}", stats.raw_results);
    println!("  Unique domains: {}", stats.records);
    println!("  Columns: {}", stats.fields);
    println!();

    println!("Queries by Outcome:");
    println!("  Exhausted: {}", stats.exhausted_queries);
    println!("  Page limit: {}", stats.page_limited_queries);
    println!("  Failed: {}", stats.failed_queries);
    println!();

    if !stats.failures.is_empty() {
        println!("Failure Summary:");
        let mut failure_counts: Vec<_> = stats.failures.iter().collect();
        failure_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in failure_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Yield: {:.1}% ({} unique / {} raw results)",
        stats.yield_rate(),
        stats.records,
        stats.raw_results
    );
}
