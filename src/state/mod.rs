//! State module for one harvest session
//!
//! # Components
//!
//! - `Query`, `SearchResult`, `Record`: the data flowing from the API to the output
//! - `Aggregator`: the shared dedup store every worker admits results into
//! - `PageReport`: raw per-page result counts for diagnostics
//! - `Progress`: atomic completed-query counters

mod aggregator;
mod page_report;
mod progress;
mod record;

// Re-export main types
pub use aggregator::{Admission, Aggregator, Harvest};
pub use page_report::{PageReport, PageRow};
pub use progress::Progress;
pub use record::{Query, QueryId, Record, SearchResult, DOMAIN_FIELD, QUERY_FIELD};
