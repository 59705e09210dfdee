use crate::config::types::{
    Config, HarvestConfig, OutputConfig, RateLimitConfig, SearchConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_harvest_config(&config.harvest)?;
    if let Some(rate_limit) = &config.rate_limit {
        validate_rate_limit_config(rate_limit)?;
    }
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates search API configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "endpoint must use HTTP or HTTPS, got '{}'",
            endpoint.scheme()
        )));
    }

    if config.api_key_header.trim().is_empty() {
        return Err(ConfigError::Validation(
            "api_key_header cannot be empty".to_string(),
        ));
    }

    if config.results_field.trim().is_empty() {
        return Err(ConfigError::Validation(
            "results_field cannot be empty".to_string(),
        ));
    }

    if let Some(per_page) = config.results_per_page {
        if !(1..=100).contains(&per_page) {
            return Err(ConfigError::Validation(format!(
                "results_per_page must be between 1 and 100, got {}",
                per_page
            )));
        }
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    Ok(())
}

/// Validates pagination and concurrency settings
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_queries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_queries must be >= 1, got {}",
            config.max_concurrent_queries
        )));
    }

    if config.empty_page_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "empty_page_threshold must be >= 1, got {}",
            config.empty_page_threshold
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if !config.requests_per_second.is_finite() || config.requests_per_second < 0.001 {
        return Err(ConfigError::Validation(format!(
            "requests_per_second must be a number >= 0.001, got {}",
            config.requests_per_second
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Client name: non-empty, alphanumeric + hyphens only
    if config.client_name.is_empty() {
        return Err(ConfigError::Validation(
            "client_name cannot be empty".to_string(),
        ));
    }

    if !config
        .client_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "client_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.client_name
        )));
    }

    if config.client_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "client_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
