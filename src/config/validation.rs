use crate::config::types::{
    Config, HttpConfig, LocatorConfig, PatternConfig, PipelineConfig, SearchConfig,
    ValidatorConfig,
};
use crate::url::SitePattern;
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;
use url::Url;

/// Upper bound for the chapter fetch concurrency ceiling
const MAX_CONCURRENT_FETCHES: usize = 500;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(title) = &config.title {
        if title.trim().is_empty() {
            return Err(ConfigError::Validation("title cannot be empty".to_string()));
        }
    }
    validate_sites(&config.sites)?;
    validate_locator_config(&config.locator)?;
    validate_validator_config(&config.validator)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_http_config(&config.http)?;
    validate_search_config(&config.search)?;
    validate_pattern_config(&config.patterns)?;
    Ok(())
}

fn validate_sites(sites: &[String]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one site must be configured".to_string(),
        ));
    }
    for site in sites {
        SitePattern::parse(site).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
    }
    Ok(())
}

fn validate_locator_config(config: &LocatorConfig) -> Result<(), ConfigError> {
    if config.max_depth < 1 {
        return Err(ConfigError::Validation(
            "max-depth must be >= 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_validator_config(config: &ValidatorConfig) -> Result<(), ConfigError> {
    if config.chapter_threshold < 1 {
        return Err(ConfigError::Validation(
            "chapter-threshold must be >= 1".to_string(),
        ));
    }
    validate_tag_list("title-tags", &config.title_tags)
}

fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > MAX_CONCURRENT_FETCHES
    {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and {}, got {}",
            MAX_CONCURRENT_FETCHES, config.max_concurrent_fetches
        )));
    }
    validate_tag_list("content-tags", &config.content_tags)
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }
    if config.request_timeout_secs == 0 || config.resolve_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeouts must be at least one second".to_string(),
        ));
    }
    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid search endpoint '{}': {}", config.endpoint, e))
    })?;
    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Search endpoint '{}' must use HTTP or HTTPS",
            config.endpoint
        )));
    }
    if config.query_param.is_empty() {
        return Err(ConfigError::Validation(
            "query-param cannot be empty".to_string(),
        ));
    }
    Selector::parse(&config.result_selector).map_err(|e| ConfigError::Selector {
        selector: config.result_selector.clone(),
        message: e.to_string(),
    })?;
    Ok(())
}

fn validate_pattern_config(config: &PatternConfig) -> Result<(), ConfigError> {
    Regex::new(&config.chapter)?;
    Regex::new(&config.contents)?;
    Ok(())
}

/// Tag lists are plain element names joined into a selector group
fn validate_tag_list(name: &str, tags: &[String]) -> Result<(), ConfigError> {
    if tags.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }
    for tag in tags {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "{} entry '{}' is not an element name",
                name, tag
            )));
        }
    }
    Ok(())
}
