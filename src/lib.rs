//! Serp-Harvester: bulk keyword search harvesting
//!
//! This crate runs many search queries against a paginated JSON search API,
//! deduplicates the results globally by registrable domain, and writes one
//! combined table plus a per-query page-count diagnostic table.

pub mod config;
pub mod harvest;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Serp-Harvester operations
///
/// Only run-level failures surface here. Per-query fetch failures and
/// per-result domain failures are contained inside the worker that hit them.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No queries to run")]
    NoQueries,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),

    #[error("Worker pool failure: {0}")]
    Pool(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while reducing a URL to its registrable domain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Result has no URL")]
    MissingUrl,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("IP address host has no registrable domain: {0}")]
    IpHost(String),

    #[error("No registrable domain for host: {0}")]
    NotRegistrable(String),
}

/// Result type alias for Serp-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for domain normalization
pub type DomainResult<T> = std::result::Result<T, DomainError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{run, Coordinator, HarvestOutcome, PageFetcher, SearchClient};
pub use output::WriteOutcome;
pub use state::{Aggregator, Harvest, Record, SearchResult};
pub use url::{registrable_domain, DomainKey};
