use crate::config::types::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, RootEntry, UserAgentConfig,
};
use crate::url::normalize_directory_url;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_roots(&config.roots, &config.crawler.anchor_segment)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 256, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(
            "max_depth must be >= 1".to_string(),
        ));
    }

    if config.max_nodes < 1 {
        return Err(ConfigError::Validation(
            "max_nodes must be >= 1".to_string(),
        ));
    }

    let anchor = &config.anchor_segment;
    if anchor.is_empty() || anchor.contains('/') {
        return Err(ConfigError::Validation(format!(
            "anchor_segment must be a single non-empty path segment, got '{}'",
            anchor
        )));
    }

    Ok(())
}

/// Validates timeout and retry settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.connect_timeout_ms > config.request_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_ms ({}ms) cannot exceed request_timeout_ms ({}ms)",
            config.connect_timeout_ms, config.request_timeout_ms
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.backoff_base_ms > config.max_backoff_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_base_ms ({}ms) cannot exceed max_backoff_ms ({}ms)",
            config.backoff_base_ms, config.max_backoff_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.is_empty() {
        return Err(ConfigError::Validation(
            "json_path cannot be empty".to_string(),
        ));
    }

    if matches!(config.database_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "database_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl roots: at least one, each a unique directory URL below the anchor
fn validate_roots(roots: &[RootEntry], anchor: &str) -> Result<(), ConfigError> {
    if roots.is_empty() {
        return Err(ConfigError::Validation(
            "At least one [[root]] entry is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();

    for root in roots {
        if root.component.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Root '{}' must name its component",
                root.url
            )));
        }

        let url = normalize_directory_url(&root.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", root.url, e))
        })?;

        let has_anchor = url
            .path_segments()
            .map(|mut segments| segments.any(|s| s == anchor))
            .unwrap_or(false);
        if !has_anchor {
            return Err(ConfigError::Validation(format!(
                "Root URL '{}' must contain the anchor segment '{}'",
                root.url, anchor
            )));
        }

        if !seen.insert(url.as_str().to_string()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate root URL '{}'",
                url
            )));
        }
    }

    Ok(())
}
