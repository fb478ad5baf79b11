use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 64, got {}",
            config.max_workers
        )));
    }

    if config.max_concurrent_tasks < 1 || config.max_concurrent_tasks > 32 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_tasks must be between 1 and 32, got {}",
            config.max_concurrent_tasks
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    validate_user_agent(&config.default)
}

/// Validates a user agent string
///
/// Shared with the dispatch boundary, which validates per-request user agents.
pub(crate) fn validate_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    // Header values must be visible ASCII
    if !user_agent.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return Err(ConfigError::Validation(format!(
            "user agent must be printable ASCII, got '{}'",
            user_agent
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
