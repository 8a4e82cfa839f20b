//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_host(config)?;
    validate_pipeline(config)?;
    validate_changelog(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> crate::error::RelnotesError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
    .into()
}

fn validate_host(config: &Config) -> Result<()> {
    for (field, value) in [
        ("host.api_url", &config.host.api_url),
        ("host.web_url", &config.host.web_url),
    ] {
        if let Err(e) = url::Url::parse(value) {
            return Err(invalid(field, format!("not a valid URL: {}", e)));
        }
    }

    if config.host.timeout_secs == 0 {
        return Err(invalid("host.timeout_secs", "must be greater than zero"));
    }

    if config.host.user_agent.trim().is_empty() {
        return Err(invalid("host.user_agent", "user agent cannot be empty"));
    }

    Ok(())
}

fn validate_pipeline(config: &Config) -> Result<()> {
    if !(1..=100).contains(&config.pipeline.per_page) {
        return Err(invalid("pipeline.per_page", "must be between 1 and 100"));
    }

    if config.pipeline.concurrency == 0 {
        return Err(invalid("pipeline.concurrency", "must be at least 1"));
    }

    Ok(())
}

fn validate_changelog(config: &Config) -> Result<()> {
    let changelog = &config.changelog;

    if changelog.empty_message.trim().is_empty() {
        return Err(invalid("changelog.empty_message", "cannot be blank"));
    }

    for (i, rule) in changelog.rules.iter().enumerate() {
        if rule.title_prefixes.is_empty() && rule.message_markers.is_empty() {
            return Err(invalid(
                format!("changelog.rules[{}]", i),
                "rule needs at least one title prefix or message marker",
            ));
        }

        let blank = rule
            .title_prefixes
            .iter()
            .chain(rule.message_markers.iter())
            .any(|p| p.trim().is_empty());
        if blank {
            return Err(invalid(
                format!("changelog.rules[{}]", i),
                "prefixes and markers cannot be blank",
            ));
        }
    }

    for category in crate::types::Category::ALL {
        if changelog.sections.heading(category).trim().is_empty() {
            return Err(invalid(
                format!("changelog.sections.{}", category),
                "heading cannot be blank",
            ));
        }
    }

    Ok(())
}
