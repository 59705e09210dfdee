//! Scripted page fetcher for engine tests.
//!
//! Pages are keyed by query text and page number. Unscripted pages come back
//! empty. Every request is recorded with its dispatch time so tests can
//! assert on pagination order and rate limiting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::Instant;

use crate::harvest::fetcher::{FetchError, PageFetcher};
use crate::state::{Query, SearchResult};

type Script = HashMap<(String, u32), Result<Vec<Value>, FetchError>>;

#[derive(Clone, Default)]
pub struct MockFetcher {
    script: Arc<Mutex<Script>>,
    requests: Arc<Mutex<Vec<(String, u32, Instant)>>>,
    latency: Option<Duration>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the raw entries returned for one query page
    pub fn page(self, query: &str, page: u32, entries: Vec<Value>) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert((query.to_string(), page), Ok(entries));
        self
    }

    /// Scripts a failure for one query page
    pub fn fail(self, query: &str, page: u32, error: FetchError) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert((query.to_string(), page), Err(error));
        self
    }

    /// Makes every fetch take this long
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// One result entry per domain, linking to its `www.` host
    pub fn links(domains: &[&str]) -> Vec<Value> {
        domains
            .iter()
            .enumerate()
            .map(|(i, domain)| {
                json!({
                    "title": domain,
                    "link": format!("https://www.{}/", domain),
                    "position": i + 1,
                })
            })
            .collect()
    }

    /// Pages requested for a query, in request order
    pub fn requested_pages(&self, query: &str) -> Vec<u32> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(q, _, _)| q == query)
            .map(|(_, page, _)| *page)
            .collect()
    }

    /// Dispatch time of every request, in request order
    pub fn dispatch_times(&self) -> Vec<Instant> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, at)| *at)
            .collect()
    }

}

impl PageFetcher for MockFetcher {
    async fn fetch(&self, query: &Query, page: u32) -> Result<Vec<SearchResult>, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((query.text.to_string(), page, Instant::now()));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = self
            .script
            .lock()
            .unwrap()
            .get(&(query.text.to_string(), page))
            .cloned();

        let entries = match scripted {
            Some(Ok(entries)) => entries,
            Some(Err(error)) => return Err(error),
            None => Vec::new(),
        };

        Ok(entries
            .into_iter()
            .map(|entry| {
                let attributes = entry.as_object().cloned().unwrap_or_default();
                SearchResult::from_entry(query.clone(), attributes)
            })
            .collect())
    }
}
