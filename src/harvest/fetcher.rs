//! Search API page fetcher
//!
//! This module handles every request to the external search API:
//! - Building the HTTP client with the user agent and per-request timeout
//! - One POST per query page, carrying the API key header
//! - Turning the JSON response into search results
//! - Error classification
//!
//! There is no retry here. A failed page is reported once and the caller
//! decides what happens to the rest of the query.

use crate::config::{SearchConfig, UserAgentConfig};
use crate::state::{Query, SearchResult};
use crate::HarvestError;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Why a single page fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Timeout, connection failure, or an interrupted body
    #[error("network failure: {0}")]
    Network(String),

    /// The API answered with a non-success status
    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    /// The body was not JSON or had no usable results list
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Fetches one page of results for one query
///
/// An empty list is a successful answer meaning the page had no results.
pub trait PageFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        query: &Query,
        page: u32,
    ) -> impl Future<Output = Result<Vec<SearchResult>, FetchError>> + Send;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num: Option<u32>,
}

/// HTTP implementation of [`PageFetcher`] for a JSON search endpoint
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: String,
    api_key_header: HeaderName,
    api_key: HeaderValue,
    results_field: String,
    results_per_page: Option<u32>,
}

impl SearchClient {
    /// Creates a client bound to one API key
    ///
    /// # Arguments
    ///
    /// * `search` - Endpoint, header, and timeout settings
    /// * `user_agent` - Client identification
    /// * `api_key` - The key sent with every request
    ///
    /// # Example
    ///
    /// ```no_run
    /// use serp_harvester::config::{SearchConfig, UserAgentConfig};
    /// use serp_harvester::harvest::SearchClient;
    ///
    /// let user_agent = UserAgentConfig {
    ///     client_name: "serp-harvester".to_string(),
    ///     client_version: "0.1.0".to_string(),
    /// };
    /// let client = SearchClient::new(&SearchConfig::default(), &user_agent, "secret").unwrap();
    /// ```
    pub fn new(
        search: &SearchConfig,
        user_agent: &UserAgentConfig,
        api_key: &str,
    ) -> Result<Self, HarvestError> {
        let api_key_header =
            HeaderName::from_bytes(search.api_key_header.as_bytes()).map_err(|e| {
                HarvestError::InvalidHeader(format!("{}: {}", search.api_key_header, e))
            })?;
        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|e| HarvestError::InvalidHeader(format!("API key: {}", e)))?;
        api_key.set_sensitive(true);

        Ok(Self {
            client: build_http_client(user_agent, search.request_timeout())?,
            endpoint: search.endpoint.clone(),
            api_key_header,
            api_key,
            results_field: search.results_field.clone(),
            results_per_page: search.results_per_page,
        })
    }
}

impl PageFetcher for SearchClient {
    async fn fetch(&self, query: &Query, page: u32) -> Result<Vec<SearchResult>, FetchError> {
        let body = SearchRequest {
            q: &*query.text,
            page,
            num: self.results_per_page,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(self.api_key_header.clone(), self.api_key.clone())
            .json(&body)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::MalformedResponse(e.to_string())
            } else {
                classify_error(e)
            }
        })?;

        parse_results(query, &payload, &self.results_field)
    }
}

/// Builds an HTTP client with the configured user agent and timeout
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Extracts search results from a response body
///
/// Every entry of the results list is one result, so the page's raw count is
/// the list length. Entries without a URL are kept here and rejected at
/// admission; a non-object entry becomes a result with no attributes.
pub fn parse_results(
    query: &Query,
    payload: &Value,
    results_field: &str,
) -> Result<Vec<SearchResult>, FetchError> {
    let entries = payload
        .get(results_field)
        .ok_or_else(|| {
            FetchError::MalformedResponse(format!("missing '{}' field", results_field))
        })?
        .as_array()
        .ok_or_else(|| {
            FetchError::MalformedResponse(format!("'{}' is not a list", results_field))
        })?;

    Ok(entries
        .iter()
        .map(|entry| {
            let attributes = entry.as_object().cloned().unwrap_or_default();
            SearchResult::from_entry(query.clone(), attributes)
        })
        .collect())
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Network("request timeout".to_string())
    } else if e.is_connect() {
        FetchError::Network(format!("connection failed: {}", e))
    } else {
        FetchError::Network(e.to_string())
    }
}
