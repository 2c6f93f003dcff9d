use crate::config::types::{AuditorConfig, Config, CrawlerConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_auditor_config(&config.auditor)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth and delay_ms are unsigned, so only the page cap needs a check
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates auditor configuration
fn validate_auditor_config(config: &AuditorConfig) -> Result<(), ConfigError> {
    if config.timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "timeout_ms must be >= 1".to_string(),
        ));
    }

    match config.engine_command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Validation(
            "engine_command must name a program".to_string(),
        )),
    }
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}
