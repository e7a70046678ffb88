//! Check-Host Tester
//!
//! Submits ping and HTTP reachability checks to the check-host.net
//! distributed measurement service, polls until the probe nodes report,
//! and aggregates the per-node results into per-region and overall
//! latency statistics.

pub mod app;
pub mod cli;
pub mod config;
pub mod client;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod nodes;
pub mod normalize;
pub mod output;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use client::{CheckHostClient, CheckTransport};
pub use executor::{CancelSignal, CheckExecutor, PollOutcome, PollTermination};
pub use models::{CheckJob, Config, JobHandle, NodeState, NormalizedNodeResult, RawResults, Report};
pub use nodes::{NodeDirectory, NodeInfo, NodeSelection};
pub use output::{ColoredFormatter, OutputFormatter, OutputFormatterFactory, PlainFormatter, ReportWriter};
pub use stats::{OverallStats, RegionStats, StatisticsEngine};
pub use types::{CheckType, OutputFormat, Region};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata recorded by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// One-line version banner for debug output
pub fn version_banner() -> String {
    format!("{} v{} ({} {}, built {})", PKG_NAME, VERSION, GIT_COMMIT, TARGET_TRIPLE, BUILD_TIME)
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_API_URL: &str = "https://check-host.net";
    pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const DEFAULT_NODE_SELECTOR: &str = "ALL";
}
