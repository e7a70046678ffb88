//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Kind of check submitted to the measurement service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    /// ICMP echo, several attempts per node
    Ping,
    /// Single HTTP fetch per node
    Http,
}

impl CheckType {
    /// Lowercase name, also used in the service endpoint path
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Ping => "ping",
            CheckType::Http => "http",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ping" => Ok(CheckType::Ping),
            "http" => Ok(CheckType::Http),
            other => Err(AppError::invalid_request(format!(
                "Check type must be either 'ping' or 'http', got '{}'",
                other
            ))),
        }
    }
}

/// Coarse geographic grouping of probe nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "EU-EAST")]
    EuEast,
    #[serde(rename = "AS")]
    As,
    #[serde(rename = "NA")]
    Na,
    #[serde(rename = "SA")]
    Sa,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Region {
    /// Every region, in the order the directory lists them
    pub const ALL: [Region; 6] = [
        Region::Eu,
        Region::As,
        Region::Na,
        Region::Sa,
        Region::EuEast,
        Region::Unknown,
    ];

    /// Region tag as shown to users and used as a report key
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Eu => "EU",
            Region::EuEast => "EU-EAST",
            Region::As => "AS",
            Region::Na => "NA",
            Region::Sa => "SA",
            Region::Unknown => "UNKNOWN",
        }
    }

    /// Parse a region tag (case-insensitive). "UNKNOWN" is not selectable.
    pub fn from_tag(tag: &str) -> Option<Region> {
        match tag.trim().to_uppercase().as_str() {
            "EU" => Some(Region::Eu),
            "EU-EAST" => Some(Region::EuEast),
            "AS" => Some(Region::As),
            "NA" => Some(Region::Na),
            "SA" => Some(Region::Sa),
            _ => None,
        }
    }

    /// Human-readable description for menus
    pub fn description(&self) -> &'static str {
        match self {
            Region::Eu => "European nodes",
            Region::EuEast => "Eastern European nodes",
            Region::As => "Asian nodes",
            Region::Na => "North American nodes",
            Region::Sa => "South American nodes",
            Region::Unknown => "Nodes missing from the directory",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File format for saved reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured record, full floating-point precision
    Json,
    /// Human-readable text, one decimal digit
    Txt,
}

impl OutputFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Txt => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "txt" | "text" => Ok(OutputFormat::Txt),
            other => Err(AppError::invalid_request(format!("Unknown output format '{}'", other))),
        }
    }
}
