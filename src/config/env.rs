//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file; a missing file is not an error.
    ///
    /// Variables already present in the process environment are kept.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "CHECK_HOST_API_URL" => {
                let parsed = url::Url::parse(value.trim())
                    .map_err(|e| AppError::config(format!("Invalid CHECK_HOST_API_URL value '{}': {}", value, e)))?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!("CHECK_HOST_API_URL must use http or https: {}", value)));
                }
            }
            "POLL_TIMEOUT_SECONDS" => Self::validate_seconds(key, value, 1, 300)?,
            "POLL_INTERVAL_SECONDS" => Self::validate_seconds(key, value, 1, 60)?,
            "REQUEST_TIMEOUT_SECONDS" => Self::validate_seconds(key, value, 1, 120)?,
            "ENABLE_COLOR" => {
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {
                // Not ours
            }
        }

        Ok(())
    }

    fn validate_seconds(key: &str, value: &str, min: u64, max: u64) -> Result<()> {
        let seconds: u64 = value
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
        if seconds < min || seconds > max {
            return Err(AppError::config(format!(
                "{} must be between {} and {}, got: {}",
                key, min, max, seconds
            )));
        }
        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("CHECK_HOST_API_URL", "Base URL of the check-host API", "https://check-host.net"),
            ("POLL_TIMEOUT_SECONDS", "Seconds to wait for node results (1-300)", "30"),
            ("POLL_INTERVAL_SECONDS", "Seconds between result polls (1-60)", "2"),
            ("REQUEST_TIMEOUT_SECONDS", "Per-request HTTP timeout (1-120)", "10"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<24} {}\n", var, description));
            help.push_str(&format!("  {:<24} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("CHECK_HOST_API_URL", "https://check-host.net").is_ok());
        assert!(EnvManager::validate_env_var("CHECK_HOST_API_URL", "http://localhost:8080").is_ok());
        assert!(EnvManager::validate_env_var("POLL_TIMEOUT_SECONDS", "300").is_ok());
        assert!(EnvManager::validate_env_var("POLL_INTERVAL_SECONDS", "1").is_ok());
        assert!(EnvManager::validate_env_var("REQUEST_TIMEOUT_SECONDS", " 10 ").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("SOMETHING_ELSE", "whatever").is_ok());

        assert!(EnvManager::validate_env_var("CHECK_HOST_API_URL", "ftp://check-host.net").is_err());
        assert!(EnvManager::validate_env_var("CHECK_HOST_API_URL", "not a url").is_err());
        assert!(EnvManager::validate_env_var("POLL_TIMEOUT_SECONDS", "0").is_err());
        assert!(EnvManager::validate_env_var("POLL_TIMEOUT_SECONDS", "301").is_err());
        assert!(EnvManager::validate_env_var("POLL_INTERVAL_SECONDS", "61").is_err());
        assert!(EnvManager::validate_env_var("REQUEST_TIMEOUT_SECONDS", "abc").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
    }

    #[test]
    fn test_get_supported_env_vars() {
        let vars = EnvManager::get_supported_env_vars();
        assert_eq!(vars.len(), 5);
        for (name, _, example) in vars {
            assert!(EnvManager::validate_env_var(name, example).is_ok(), "{} example invalid", name);
        }
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("POLL_TIMEOUT_SECONDS"));
        assert!(help.contains("Configuration Priority"));
    }

    #[test]
    fn test_missing_env_file_is_fine() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(EnvManager::load_env_file_from(&dir.path().join(".env"), false).is_ok());
    }
}
