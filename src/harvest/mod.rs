//! Harvest module for running queries against the search API
//!
//! This module contains the core harvesting logic, including:
//! - Single-attempt page fetching over HTTP
//! - Per-query pagination and termination
//! - Global request-rate limiting
//! - The bounded worker pool and overall session coordination

mod coordinator;
mod fetcher;
mod rate_limit;
mod scheduler;
mod worker;

#[cfg(test)]
pub(crate) mod testutil;

pub use coordinator::{run, Coordinator, HarvestOutcome, SessionReport};
pub use fetcher::{build_http_client, parse_results, FetchError, PageFetcher, SearchClient};
pub use rate_limit::RateLimiter;
pub use scheduler::Scheduler;
pub use worker::{QueryOutcome, QueryWorker, StopReason, WorkerSettings};
