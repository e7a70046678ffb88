//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};
use std::path::PathBuf;

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            env_file: PathBuf::from(".env"),
        }
    }

    /// Read the env file from `path` instead of `./.env`
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    /// Build the configuration: defaults, then `.env`, then the process
    /// environment, then command-line flags. The result is validated.
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file_from(&self.env_file, self.cli.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);

        config.validate()?;
        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(timeout) = self.cli.timeout {
            config.poll_timeout_seconds = timeout;
        }

        if let Some(interval) = self.cli.interval {
            config.poll_interval_seconds = interval;
        }

        if let Some(ref api_url) = self.cli.api_url {
            config.api_base_url = api_url.clone();
        }

        if self.cli.no_color {
            config.enable_color = false;
        } else if self.cli.color {
            config.enable_color = true;
        }

        // CLI-only
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let summary = [
        format!("API Base URL: {}", config.api_base_url),
        format!("Poll Timeout: {}s", config.poll_timeout_seconds),
        format!("Poll Interval: {}s", config.poll_interval_seconds),
        format!("Request Timeout: {}s", config.request_timeout_seconds),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests touching the process environment take this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "CHECK_HOST_API_URL",
        "POLL_TIMEOUT_SECONDS",
        "POLL_INTERVAL_SECONDS",
        "REQUEST_TIMEOUT_SECONDS",
        "ENABLE_COLOR",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn parser(args: &[&str], dir: &TempDir) -> ConfigParser {
        let mut argv = vec!["cht"];
        argv.extend_from_slice(args);
        ConfigParser::new(Cli::parse_from(argv)).with_env_file(dir.path().join(".env"))
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        let config = parser(&["example.com"], &dir).parse().unwrap();
        assert_eq!(config.api_base_url, crate::defaults::DEFAULT_API_URL);
        assert_eq!(config.poll_timeout_seconds, 30);
        assert_eq!(config.poll_interval_seconds, 2);
        assert_eq!(config.request_timeout_seconds, 10);
        assert!(config.enable_color);
        assert!(!config.verbose);
    }

    #[test]
    fn test_cli_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        let config = parser(
            &[
                "example.com",
                "--timeout",
                "60",
                "--interval",
                "5",
                "--api-url",
                "http://127.0.0.1:9000",
                "--no-color",
                "--verbose",
            ],
            &dir,
        )
        .parse()
        .unwrap();

        assert_eq!(config.poll_timeout_seconds, 60);
        assert_eq!(config.poll_interval_seconds, 5);
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert!(!config.enable_color);
        assert!(config.verbose);
    }

    #[test]
    fn test_cli_overrides_env_vars() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        env::set_var("POLL_TIMEOUT_SECONDS", "90");
        env::set_var("POLL_INTERVAL_SECONDS", "4");

        let config = parser(&["example.com", "--timeout", "12"], &dir).parse().unwrap();
        assert_eq!(config.poll_timeout_seconds, 12);
        assert_eq!(config.poll_interval_seconds, 4);

        clear_env();
    }

    #[test]
    fn test_env_file_below_process_environment() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "REQUEST_TIMEOUT_SECONDS=25\nENABLE_COLOR=false\n",
        )
        .unwrap();
        env::set_var("ENABLE_COLOR", "true");

        let config = parser(&["example.com"], &dir).parse().unwrap();
        assert_eq!(config.request_timeout_seconds, 25);
        assert!(config.enable_color);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value_is_config_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        env::set_var("POLL_INTERVAL_SECONDS", "soon");
        let err = parser(&["example.com"], &dir).parse().unwrap_err();
        assert_eq!(err.category(), "CONFIG");

        env::set_var("POLL_INTERVAL_SECONDS", "120");
        let err = parser(&["example.com"], &dir).parse().unwrap_err();
        assert_eq!(err.exit_code(), 1);

        clear_env();
    }

    #[test]
    fn test_bad_api_url_flag_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        let err = parser(&["example.com", "--api-url", "ftp://nowhere"], &dir).parse().unwrap_err();
        assert_eq!(err.category(), "CONFIG");
    }

    #[test]
    fn test_config_summary() {
        let summary = display_config_summary(&Config::default());
        assert!(summary.contains("API Base URL: https://check-host.net"));
        assert!(summary.contains("Poll Timeout: 30s"));
        assert!(summary.contains("Poll Interval: 2s"));
    }
}
