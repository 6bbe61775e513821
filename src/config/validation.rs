//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and that the
//! service URL is usable. Every problem is reported, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ResetConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("service.base_url '{0}' is not a valid http(s) URL")]
    InvalidBaseUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("countdown.start_secs must be between 1 and 3600, got {0}")]
    CountdownOutOfRange(u32),

    #[error("polling.confirmation_phrase must not be empty")]
    EmptyPhrase,
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ResetConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.service.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(
            config.service.base_url.clone(),
        )),
    }

    if config.service.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("service.request_timeout_secs"));
    }
    if config.polling.initial_delay_ms == 0 {
        errors.push(ValidationError::Zero("polling.initial_delay_ms"));
    }
    if config.polling.interval_ms == 0 {
        errors.push(ValidationError::Zero("polling.interval_ms"));
    }
    if config.polling.max_attempts == 0 {
        errors.push(ValidationError::Zero("polling.max_attempts"));
    }
    if config.countdown.tick_ms == 0 {
        errors.push(ValidationError::Zero("countdown.tick_ms"));
    }
    if !(1..=3600).contains(&config.countdown.start_secs) {
        errors.push(ValidationError::CountdownOutOfRange(
            config.countdown.start_secs,
        ));
    }
    if config.polling.confirmation_phrase.trim().is_empty() {
        errors.push(ValidationError::EmptyPhrase);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ResetConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ResetConfig::default();
        config.service.base_url = "ftp://example.com".into();
        config.polling.max_attempts = 0;
        config.countdown.start_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Zero("polling.max_attempts")));
        assert!(errors.contains(&ValidationError::CountdownOutOfRange(0)));
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let mut config = ResetConfig::default();
        config.service.base_url = "not a url".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "service.base_url 'not a url' is not a valid http(s) URL"
        );
    }
}
