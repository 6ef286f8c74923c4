use crate::config::types::{Config, CrawlerConfig, OutputConfig, ProviderConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_provider_config(&config.provider)?;
    validate_output_config(&config.output)?;
    validate_pacing(config)?;
    Ok(())
}

/// The pause between articles must exceed the per-request quota delay
fn validate_pacing(config: &Config) -> Result<(), ConfigError> {
    if config.provider.requests_per_hour == 0 {
        return Ok(());
    }

    let politeness = config.crawler.politeness_delay();
    let rate_limit = config.provider.rate_limit_delay();
    if politeness <= rate_limit {
        return Err(ConfigError::Validation(format!(
            "politeness_delay ({}ms) must be larger than the rate-limit delay ({}ms) \
             implied by requests_per_hour = {}",
            politeness.as_millis(),
            rate_limit.as_millis(),
            config.provider.requests_per_hour
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.article_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "article_limit must be >= 1, got {}",
            config.article_limit
        )));
    }

    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "keywords must contain at least one entry".to_string(),
        ));
    }

    if let Some(blank) = config.keywords.iter().find(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "keywords cannot contain blank entries, got {:?}",
            blank
        )));
    }

    if config.progress_interval < 1 {
        return Err(ConfigError::Validation(
            "progress_interval must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates provider configuration
fn validate_provider_config(config: &ProviderConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if let Some(action_api_url) = config.action_api_url.as_deref() {
        let url = Url::parse(action_api_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid action_api_url: {}", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "action_api_url '{}' must use http or https",
                action_api_url
            )));
        }
    }

    for (name, segment) in [("provider", &config.provider), ("language", &config.language)] {
        if segment.is_empty() || segment.contains('/') {
            return Err(ConfigError::Validation(format!(
                "{} must be a single non-empty path segment, got '{}'",
                name, segment
            )));
        }
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1 second".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint_path cannot be empty".to_string(),
        ));
    }

    if config.seed_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "seed_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
