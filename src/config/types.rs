use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Serp-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(rename = "rate-limit")]
    pub rate_limit: Option<RateLimitConfig>,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// External search API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint receiving one POST per query page
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Header carrying the API key
    #[serde(rename = "api-key-header", default = "default_api_key_header")]
    pub api_key_header: String,

    /// Response field holding the result list
    #[serde(rename = "results-field", default = "default_results_field")]
    pub results_field: String,

    /// Requested page size; omitted from the request body when unset
    #[serde(rename = "results-per-page")]
    pub results_per_page: Option<u32>,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl SearchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key_header: default_api_key_header(),
            results_field: default_results_field(),
            results_per_page: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Pagination and concurrency behavior
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Maximum number of queries paginated at the same time
    #[serde(rename = "max-concurrent-queries", default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,

    /// Consecutive empty pages that end a query
    #[serde(rename = "empty-page-threshold", default = "default_empty_page_threshold")]
    pub empty_page_threshold: u32,

    /// Hard ceiling on pages fetched per query
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_concurrent_queries: default_max_concurrent_queries(),
            empty_page_threshold: default_empty_page_threshold(),
            max_pages: default_max_pages(),
        }
    }
}

/// Global request-rate ceiling shared by all workers
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(rename = "requests-per-second")]
    pub requests_per_second: f64,

    #[serde(default)]
    pub policy: RatePolicy,
}

/// What the rate ceiling measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatePolicy {
    /// Space request dispatches `1/K` seconds apart
    #[default]
    Dispatch,
    /// Also keep `1/K` seconds between a response and the next dispatch
    Completion,
}

/// Client identification sent with every request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "client-name")]
    pub client_name: String,

    #[serde(rename = "client-version")]
    pub client_version: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.client_name, self.client_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the result and page-count tables
    pub directory: String,
}

fn default_endpoint() -> String {
    "https://google.serper.dev/search".to_string()
}

fn default_api_key_header() -> String {
    "X-API-KEY".to_string()
}

fn default_results_field() -> String {
    "organic".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_max_concurrent_queries() -> usize {
    200
}

fn default_empty_page_threshold() -> u32 {
    2
}

fn default_max_pages() -> u32 {
    100
}
