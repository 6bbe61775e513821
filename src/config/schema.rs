//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! confirmation watcher. All types derive Serde traits for deserialization
//! from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the reset flow.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResetConfig {
    /// Remote reset service endpoints.
    pub service: ServiceConfig,

    /// Confirmation polling schedule.
    pub polling: PollingConfig,

    /// User-facing countdown.
    pub countdown: CountdownConfig,

    /// Where the last attempted email is kept.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: String,

    /// Path of the "request password reset" endpoint.
    pub request_path: String,

    /// Path of the "is email confirmed" endpoint.
    pub confirm_path: String,

    /// Per-call timeout in seconds.
    pub request_timeout_secs: u64,
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_path: "auth/password/forget".to_string(),
            confirm_path: "auth/email/confirmed".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay before the first confirmation check, in milliseconds.
    pub initial_delay_ms: u64,

    /// Delay between confirmation checks, in milliseconds.
    pub interval_ms: u64,

    /// Number of checks before the session is exhausted.
    pub max_attempts: u32,

    /// Message the service returns once the email is confirmed.
    /// Compared trimmed and case-insensitively.
    pub confirmation_phrase: String,
}

impl PollingConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 5000,
            interval_ms: 5000,
            max_attempts: 25,
            confirmation_phrase: "email activated.".to_string(),
        }
    }
}

/// Countdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Seconds shown when a session starts.
    pub start_secs: u32,

    /// Tick period in milliseconds.
    pub tick_ms: u64,
}

impl CountdownConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            start_secs: 60,
            tick_ms: 1000,
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the last attempted email.
    pub last_email_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            last_email_path: "last_email.json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reset_flow() {
        let config = ResetConfig::default();
        assert_eq!(config.polling.max_attempts, 25);
        assert_eq!(config.polling.interval(), Duration::from_secs(5));
        assert_eq!(config.polling.initial_delay(), Duration::from_secs(5));
        assert_eq!(config.countdown.start_secs, 60);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ResetConfig = toml::from_str(
            r#"
            [service]
            base_url = "https://example.com/api"

            [polling]
            max_attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.service.base_url, "https://example.com/api");
        assert_eq!(config.service.confirm_path, "auth/email/confirmed");
        assert_eq!(config.polling.max_attempts, 3);
        assert_eq!(config.polling.interval_ms, 5000);
        assert_eq!(config.countdown.tick_ms, 1000);
    }
}
