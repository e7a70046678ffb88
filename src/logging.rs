//! Structured logging for the check-host tester
//!
//! Entries carry a level, the emitting component and arbitrary JSON
//! fields, and are rendered either as a console line or as one JSON
//! object per line. Every logger created by a [`LoggerFactory`] stamps
//! its entries with the same session id.
//!
//! All log output goes to stderr so that report output on stdout stays clean.

use crate::error::AppError;
use crate::models::{CheckJob, Config, JobHandle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// ANSI color for the level tag
    fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    pub session_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Timestamped line with sorted `key=value` fields
    Console,
    /// One JSON object per line, used under `--debug`
    Json,
}

/// Leveled logger writing to stderr
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    component: String,
    session_id: Arc<RwLock<Option<String>>>,
}

impl Logger {
    pub fn new(component: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            component,
            session_id: Arc::new(RwLock::new(None)),
        }
    }

    /// Level and format follow the run mode: `--debug` logs everything as
    /// JSON, `--verbose` adds progress lines, otherwise only warnings show.
    pub fn with_config(component: String, config: &Config) -> Self {
        let min_level = match (config.debug, config.verbose) {
            (true, _) => LogLevel::Debug,
            (false, true) => LogLevel::Info,
            (false, false) => LogLevel::Warn,
        };

        Self {
            min_level,
            use_color: config.enable_color,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            ..Self::new(component)
        }
    }

    /// Logger that only reports errors, for tests and library callers
    pub fn quiet(component: &str) -> Self {
        let mut logger = Self::new(component.to_string());
        logger.set_level(LogLevel::Error);
        logger.set_color(false);
        logger
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub async fn set_session_id(&self, session_id: String) {
        *self.session_id.write().await = Some(session_id);
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder {
            logger: self,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                component: self.component.clone(),
                message: message.to_string(),
                session_id: None,
                fields: HashMap::new(),
            },
        }
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    async fn emit(&self, mut entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        entry.session_id = self.session_id.read().await.clone();

        let line = match self.format {
            LogFormat::Console => self.render_console(&entry),
            LogFormat::Json => render_json(&entry),
        };
        let _ = writeln!(io::stderr(), "{}", line);
    }

    fn render_console(&self, entry: &LogEntry) -> String {
        let level = if self.use_color {
            format!("{}{:>5}\x1b[0m", entry.level.color_code(), entry.level.as_str())
        } else {
            format!("{:>5}", entry.level.as_str())
        };

        let mut line = format!(
            "{} {} [{}] {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            level,
            entry.component,
            entry.message
        );

        if !entry.fields.is_empty() {
            let mut pairs: Vec<String> = entry.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            pairs.sort();
            line.push_str(" {");
            line.push_str(&pairs.join(", "));
            line.push('}');
        }
        line
    }
}

fn render_json(entry: &LogEntry) -> String {
    serde_json::to_string(entry)
        .unwrap_or_else(|_| format!("{{\"level\":\"{}\",\"message\":{:?}}}", entry.level.as_str(), entry.message))
}

/// Accumulates fields for one entry before it is written
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl LogEntryBuilder<'_> {
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), value);
        }
        self
    }

    /// Attach category, recoverability and exit code of `error`
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    pub async fn log(self) {
        self.logger.emit(self.entry).await;
    }
}

/// Traces the lifecycle of a check: submission, poll rounds, outcome
#[derive(Clone)]
pub struct PollLogger {
    logger: Logger,
}

impl PollLogger {
    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn log_submission(&self, job: &CheckJob, handle: &JobHandle) {
        self.logger
            .info(&format!(
                "Submitted {} check for {} to {} nodes",
                job.check_type(),
                job.target_host(),
                job.node_count()
            ))
            .field("check_type", job.check_type())
            .field("host", job.target_host())
            .field("nodes", job.node_count())
            .field("request_id", &handle.request_id)
            .field("permanent_link", &handle.permanent_link)
            .log()
            .await;
    }

    pub async fn log_poll_round(&self, round: u32, pending: usize, expected: usize, elapsed_ms: u128) {
        self.logger
            .debug(&format!("Poll round {}: {}/{} nodes pending", round, pending, expected))
            .field("round", round)
            .field("pending", pending)
            .field("expected", expected)
            .field("elapsed_ms", elapsed_ms as u64)
            .log()
            .await;
    }

    /// Info when every node reported, a warning when some are still pending
    pub async fn log_poll_outcome(&self, termination: &str, reported: usize, pending: usize, rounds: u32) {
        let level = if pending == 0 { LogLevel::Info } else { LogLevel::Warn };
        self.logger
            .log(
                level,
                &format!(
                    "Polling finished ({}): {} reported, {} pending after {} rounds",
                    termination, reported, pending, rounds
                ),
            )
            .field("termination", termination)
            .field("reported", reported)
            .field("pending", pending)
            .field("rounds", rounds)
            .log()
            .await;
    }

    pub async fn log_fetch_failure(&self, error: &AppError, round: u32) {
        self.logger
            .error(&format!("Fetching results failed in round {}: {}", round, error))
            .field("round", round)
            .error_info(error)
            .log()
            .await;
    }
}

/// Records errors that end a run
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub async fn log_error(&self, error: &AppError, context: Option<&str>) {
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.to_string(),
        };

        let mut builder = self.logger.error(&message).error_info(error);
        if let Some(ctx) = context {
            builder = builder.field("context", ctx);
        }
        builder.log().await;
    }
}

/// Creates loggers that share one session id
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn create_logger(&self, component: &str) -> Logger {
        let logger = Logger::with_config(component.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_poll_logger(&self) -> PollLogger {
        PollLogger::from_logger(self.create_logger("POLL").await)
    }

    pub async fn create_error_logger(&self) -> ErrorEventLogger {
        ErrorEventLogger::from_logger(self.create_logger("ERR").await)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*)).log().await
    };
}
