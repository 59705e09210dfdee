//! Per-query page counts
//!
//! Raw result counts are recorded for every page a query successfully
//! fetched, before dedup. The report exists for diagnosing pagination.

use crate::state::record::{Query, QueryId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Page counts of a single query
#[derive(Debug, Clone)]
pub struct PageRow {
    pub query: Arc<str>,
    /// Page number -> raw result count
    pub counts: BTreeMap<u32, usize>,
}

/// Append-only mapping from (query, page) to raw result count
///
/// Every submitted query has a row, even if it never fetched a page.
#[derive(Debug, Clone, Default)]
pub struct PageReport {
    rows: Vec<PageRow>,
}

impl PageReport {
    pub fn new(queries: &[Query]) -> Self {
        let mut rows: Vec<PageRow> = Vec::with_capacity(queries.len());
        for query in queries {
            if query.id >= rows.len() {
                rows.resize_with(query.id + 1, || PageRow {
                    query: Arc::from(""),
                    counts: BTreeMap::new(),
                });
            }
            rows[query.id].query = query.text.clone();
        }
        Self { rows }
    }

    /// Records the raw result count for one page of one query
    ///
    /// Unknown query ids are ignored; a page recorded twice keeps its first count.
    pub fn record(&mut self, query: QueryId, page: u32, count: usize) {
        match self.rows.get_mut(query) {
            Some(row) => {
                row.counts.entry(page).or_insert(count);
            }
            None => tracing::warn!(query_id = query, page, "Page count for unknown query"),
        }
    }

    /// Result count for a query page, if that page was fetched
    pub fn count(&self, query: QueryId, page: u32) -> Option<usize> {
        self.rows.get(query)?.counts.get(&page).copied()
    }

    /// Every page number observed across any query, ascending
    pub fn page_numbers(&self) -> BTreeSet<u32> {
        self.rows
            .iter()
            .flat_map(|row| row.counts.keys().copied())
            .collect()
    }

    /// Rows in query order
    pub fn rows(&self) -> &[PageRow] {
        &self.rows
    }

    /// Total number of pages fetched successfully
    pub fn pages_fetched(&self) -> usize {
        self.rows.iter().map(|row| row.counts.len()).sum()
    }

    /// Total raw results across all pages
    pub fn raw_results(&self) -> usize {
        self.rows.iter().flat_map(|row| row.counts.values()).sum()
    }
}
