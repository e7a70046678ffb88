//! Data models and structures for the check-host tester

pub mod check;
pub mod config;
pub mod raw;
pub mod report;

// Re-export main model types
pub use check::{CheckJob, JobHandle};
pub use config::Config;
pub use raw::{HttpAttempt, NodeState, PingAttempt, RawResults};
pub use report::{HttpOutcome, NormalizedNodeResult, Report};
