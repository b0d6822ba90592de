use crate::config::types::{Config, CrawlConfig, EngineConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on `concurrency-limit` accepted from a configuration file
pub const MAX_FILE_CONCURRENCY: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    if config.engine.concurrency_limit > MAX_FILE_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency-limit must be between 1 and {}, got {}",
            MAX_FILE_CONCURRENCY, config.engine.concurrency_limit
        )));
    }
    validate_user_agent_config(&config.user_agent)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates engine tunables
///
/// Also run by `EngineBuilder::build` for configs constructed in code.
pub fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.concurrency_limit == 0 {
        return Err(ConfigError::Validation(
            "concurrency_limit must be > 0".to_string(),
        ));
    }

    if config.fetch_timeout_ms == Some(0) {
        return Err(ConfigError::Validation(
            "fetch_timeout_ms must be > 0 when set".to_string(),
        ));
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

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates seeds and crawl scope
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use HTTP or HTTPS scheme",
                seed
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.separator.is_empty() {
        return Err(ConfigError::Validation(
            "separator cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.file_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "file_path cannot be empty when set".to_string(),
            ));
        }
    }

    if !config.console && config.file_path.is_none() {
        tracing::warn!("No sinks configured; extracted records will be discarded");
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
