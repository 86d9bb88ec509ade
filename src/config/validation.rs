//! Configuration validation logic.

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_attempts(config.options.max_attempts)?;
    validate_delays(
        config.options.retry_delay_min_secs,
        config.options.retry_delay_max_secs,
    )?;
    if let Some(link) = config.until_link() {
        validate_until_link(link)?;
    }
    config.cookie_browser()?;

    Ok(())
}

/// Validate the per-link attempt budget.
pub fn validate_attempts(max_attempts: u32) -> Result<()> {
    if max_attempts == 0 {
        return Err(Error::ConfigValidation {
            field: "max_attempts".to_string(),
            message: "At least one attempt is required".to_string(),
        });
    }
    Ok(())
}

/// Validate the retry delay range.
pub fn validate_delays(min_secs: u64, max_secs: u64) -> Result<()> {
    if min_secs > max_secs {
        return Err(Error::ConfigValidation {
            field: "retry_delay_min_secs".to_string(),
            message: format!(
                "Minimum delay ({}s) exceeds maximum delay ({}s)",
                min_secs, max_secs
            ),
        });
    }
    Ok(())
}

/// Validate the feed stop link.
pub fn validate_until_link(link: &str) -> Result<()> {
    let url = url::Url::parse(link).map_err(|e| Error::ConfigValidation {
        field: "until_link".to_string(),
        message: format!("'{}' is not a valid URL: {}", link, e),
    })?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(Error::ConfigValidation {
            field: "until_link".to_string(),
            message: format!("'{}' must be an http(s) link", link),
        });
    }

    Ok(())
}
