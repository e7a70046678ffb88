//! Command-line interface module

pub mod interactive;

pub use interactive::InteractivePrompt;

use crate::error::{AppError, Result};
use crate::models::check::validate_host;
use crate::nodes::{NodeDirectory, NodeSelection};
use crate::types::{CheckType, OutputFormat};
use clap::Parser;
use std::path::PathBuf;

/// A fully resolved check request, from flags or from the interactive prompt
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRequest {
    pub host: String,
    pub check_type: CheckType,
    pub selection: NodeSelection,
    pub save: bool,
    pub format: OutputFormat,
    /// Explicit output path; `None` means an auto-generated name
    pub output: Option<PathBuf>,
}

/// Check Host Tester - probe a host from check-host.net nodes around the world
#[derive(Parser, Debug, Clone)]
#[command(name = "cht")]
#[command(version, about, long_about = None)]
#[command(after_help = "Run without HOST to answer the questions interactively.")]
pub struct Cli {
    /// Host to check (domain, IP address, or http(s) URL)
    pub host: Option<String>,

    /// Type of check to run
    #[arg(short = 't', long = "type", value_enum, default_value_t = CheckType::Ping)]
    pub check_type: CheckType,

    /// Node selection: ALL, EU, AS, NA, SA, EU-EAST, or EU+NA
    #[arg(short = 'n', long, default_value = crate::defaults::DEFAULT_NODE_SELECTOR)]
    pub nodes: String,

    /// Save results to a file
    #[arg(short = 's', long)]
    pub save: bool,

    /// Output file path (implies --save)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Format of the saved file
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Maximum seconds to wait for node results
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub timeout: Option<u64>,

    /// Seconds between result polls
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub interval: Option<u64>,

    /// Base URL of the check-host API
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// List the known nodes and exit
    #[arg(long)]
    pub list_nodes: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if let (Some(timeout), Some(interval)) = (self.timeout, self.interval) {
            if interval > timeout {
                return Err(format!(
                    "--interval ({}s) cannot exceed --timeout ({}s)",
                    interval, timeout
                ));
            }
        }

        Ok(())
    }

    /// No host on the command line means the questions are asked on stdin
    pub fn is_interactive(&self) -> bool {
        self.host.is_none() && !self.list_nodes
    }

    pub fn should_save(&self) -> bool {
        self.save || self.output.is_some()
    }

    /// Resolve the command-line flags into a check request
    pub fn to_request(&self, directory: &NodeDirectory) -> Result<CheckRequest> {
        let host = self
            .host
            .as_deref()
            .ok_or_else(|| AppError::invalid_request("No host given"))?;

        Ok(CheckRequest {
            host: validate_host(host)?,
            check_type: self.check_type,
            selection: directory.select(&self.nodes),
            save: self.should_save(),
            format: self.format,
            output: self.output.clone(),
        })
    }

    /// Check if colors should be enabled, given the configured default
    pub fn use_colors(&self, config_default: bool) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            config_default && supports_color()
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command Line:\n");
        summary.push_str(&format!("  Host: {}\n", self.host.as_deref().unwrap_or("(interactive)")));
        summary.push_str(&format!("  Check type: {}\n", self.check_type));
        summary.push_str(&format!("  Nodes: {}\n", self.nodes));
        if self.should_save() {
            let target = self
                .output
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(auto-generated)".to_string());
            summary.push_str(&format!("  Save to: {} ({})\n", target, self.format.extension()));
        }

        summary
    }
}

/// Render the node table for `--list-nodes`
pub fn render_node_list(directory: &NodeDirectory) -> String {
    let mut output = String::new();

    output.push_str("Node selections:\n");
    for (selector, description) in directory.selector_options() {
        output.push_str(&format!("  {:<8} {}\n", selector, description));
    }

    output.push_str(&format!("\nKnown nodes ({}):\n", directory.len()));
    for id in directory.all_nodes() {
        let info = directory.lookup(&id);
        output.push_str(&format!(
            "  {:<8} {:<28} {}, {}\n",
            info.region.as_str(),
            id,
            info.country,
            info.city
        ));
    }

    output
}

/// Parse a positive number of seconds
fn parse_seconds(s: &str) -> std::result::Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
