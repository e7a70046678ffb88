//! Configuration data model and validation

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the check-host API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Maximum time to wait for nodes to report
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_seconds: u64,

    /// Pause between result fetches
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_seconds: u64,

    /// Timeout for a single HTTP request to the API
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_seconds: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            poll_timeout_seconds: default_poll_timeout_secs(),
            poll_interval_seconds: default_poll_interval_secs(),
            request_timeout_seconds: default_request_timeout_secs(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::config("API base URL cannot be empty"));
        }

        match url::Url::parse(&self.api_base_url) {
            Ok(parsed) => {
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!(
                        "API base URL must use http or https: {}",
                        self.api_base_url
                    )));
                }
            }
            Err(e) => {
                return Err(AppError::config(format!(
                    "Invalid API base URL '{}': {}",
                    self.api_base_url, e
                )));
            }
        }

        check_range("Poll timeout", self.poll_timeout_seconds, 1, 300)?;
        check_range("Poll interval", self.poll_interval_seconds, 1, 60)?;
        check_range("Request timeout", self.request_timeout_seconds, 1, 120)?;

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(api_url) = std::env::var("CHECK_HOST_API_URL") {
            let api_url = api_url.trim();
            if !api_url.is_empty() {
                self.api_base_url = api_url.to_string();
            }
        }

        if let Ok(value) = std::env::var("POLL_TIMEOUT_SECONDS") {
            self.poll_timeout_seconds = parse_seconds("POLL_TIMEOUT_SECONDS", &value)?;
        }

        if let Ok(value) = std::env::var("POLL_INTERVAL_SECONDS") {
            self.poll_interval_seconds = parse_seconds("POLL_INTERVAL_SECONDS", &value)?;
        }

        if let Ok(value) = std::env::var("REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = parse_seconds("REQUEST_TIMEOUT_SECONDS", &value)?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

fn check_range(name: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if value < min || value > max {
        return Err(AppError::config(format!(
            "{} must be between {} and {} seconds, got {}",
            name, min, max, value
        )));
    }
    Ok(())
}

fn parse_seconds(var: &str, value: &str) -> Result<u64> {
    value.trim().parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", var, value, e)))
}

// Default value functions for serde
fn default_api_base_url() -> String {
    crate::defaults::DEFAULT_API_URL.to_string()
}

fn default_poll_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_POLL_TIMEOUT.as_secs()
}

fn default_poll_interval_secs() -> u64 {
    crate::defaults::DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_request_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_base_url, "https://check-host.net");
        assert_eq!(config.poll_timeout(), Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_non_http_api_url_invalid() {
        let mut config = Config::default();
        config.api_base_url = "ftp://check-host.net".to_string();
        assert!(config.validate().is_err());

        config.api_base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_poll_timeout_invalid() {
        let mut config = Config::default();
        config.poll_timeout_seconds = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.category(), "CONFIG");
    }

    #[test]
    fn test_range_limits() {
        let mut config = Config::default();
        config.poll_timeout_seconds = 300;
        config.poll_interval_seconds = 60;
        config.request_timeout_seconds = 120;
        assert!(config.validate().is_ok());

        config.poll_interval_seconds = 61;
        assert!(config.validate().is_err());

        config.poll_interval_seconds = 2;
        config.request_timeout_seconds = 121;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = serde_json::from_str(r#"{"poll_timeout_seconds": 45}"#).unwrap();
        assert_eq!(config.poll_timeout_seconds, 45);
        assert_eq!(config.poll_interval_seconds, 2);
        assert!(config.enable_color);
    }
}
