//! Global dedup store shared by every query worker
//!
//! All mutable harvest state (seen domains, accepted records, the field set
//! and the page report) lives behind one lock, so admitting a result is a
//! single critical section: two workers seeing the same new domain at the
//! same moment can never both be accepted.

use crate::state::page_report::PageReport;
use crate::state::record::{Query, QueryId, Record, SearchResult};
use crate::url::{registrable_domain, DomainKey};
use crate::DomainError;
use std::collections::{BTreeSet, HashSet};
use tokio::sync::Mutex;

/// Outcome of offering a result to the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// First sighting of this domain; a record was stored
    Accepted(DomainKey),
    /// The domain already has a record; nothing changed
    Duplicate(DomainKey),
    /// The URL has no registrable domain; the result was skipped
    Unresolvable(DomainError),
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Everything a finished session produced
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Accepted records in admission order
    pub records: Vec<Record>,
    /// Union of attribute names across all records, sorted
    pub fields: BTreeSet<String>,
    /// Raw per-page result counts
    pub pages: PageReport,
}

impl Harvest {
    /// Returns the set of domains that received a record
    pub fn domains(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.domain.as_str()).collect()
    }
}

#[derive(Debug, Default)]
struct AggregateState {
    seen: HashSet<DomainKey>,
    harvest: Harvest,
}

/// Shared, mutually exclusive store of accepted records
#[derive(Debug)]
pub struct Aggregator {
    state: Mutex<AggregateState>,
}

impl Aggregator {
    /// Creates an empty aggregator with a page report row per query
    pub fn new(queries: &[Query]) -> Self {
        Self {
            state: Mutex::new(AggregateState {
                seen: HashSet::new(),
                harvest: Harvest {
                    pages: PageReport::new(queries),
                    ..Harvest::default()
                },
            }),
        }
    }

    /// Offers a search result for admission
    ///
    /// The domain is normalized outside the lock. The presence check, record
    /// insert and field union then run under one guard.
    pub async fn try_admit(&self, result: SearchResult) -> Admission {
        let resolved = match result.url.as_deref() {
            Some(url) => registrable_domain(url),
            None => Err(DomainError::MissingUrl),
        };
        let domain = match resolved {
            Ok(domain) => domain,
            Err(e) => return Admission::Unresolvable(e),
        };

        let mut state = self.state.lock().await;
        if !state.seen.insert(domain.clone()) {
            return Admission::Duplicate(domain);
        }

        let record = Record::admit(result, domain.clone());
        state.harvest.fields.extend(record.fields.keys().cloned());
        state.harvest.records.push(record);

        Admission::Accepted(domain)
    }

    /// Records the raw result count of a fetched page
    pub async fn record_page(&self, query: QueryId, page: u32, count: usize) {
        self.state.lock().await.harvest.pages.record(query, page, count);
    }

    /// Number of records accepted so far
    pub async fn record_count(&self) -> usize {
        self.state.lock().await.harvest.records.len()
    }

    /// Takes the accumulated harvest, leaving the aggregator empty
    ///
    /// Call only after every worker has finished.
    pub async fn drain(&self) -> Harvest {
        let mut state = self.state.lock().await;
        state.seen.clear();
        std::mem::take(&mut state.harvest)
    }
}
