//! Check execution engine
//!
//! This module drives one check end to end:
//! - submission of the job through a `CheckTransport`
//! - polling until every expected node reports, the deadline passes,
//!   a fetch fails or the caller cancels
//! - normalization, aggregation and report assembly

pub mod cancel;

pub use cancel::CancelSignal;

use crate::{
    client::CheckTransport,
    error::{AppError, Result},
    logging::PollLogger,
    models::{CheckJob, Config, JobHandle, RawResults, Report},
    nodes::NodeDirectory,
    normalize::normalize_all,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Polling parameters for the executor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Give up waiting for nodes after this long
    pub poll_timeout: Duration,
    /// Pause between result fetches
    pub poll_interval: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            poll_timeout: crate::defaults::DEFAULT_POLL_TIMEOUT,
            poll_interval: crate::defaults::DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        Self {
            poll_timeout: config.poll_timeout(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Why polling stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTermination {
    /// Every expected node reported
    Complete,
    /// The deadline passed with nodes still pending
    TimedOut,
    /// The caller cancelled
    Cancelled,
    /// A result fetch failed; polling was not retried
    TransportFailed(String),
}

impl PollTermination {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollTermination::Complete => "complete",
            PollTermination::TimedOut => "timed out",
            PollTermination::Cancelled => "cancelled",
            PollTermination::TransportFailed(_) => "transport failure",
        }
    }
}

impl fmt::Display for PollTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollTermination::TransportFailed(message) => write!(f, "transport failure: {}", message),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Result of a polling session, always carrying the last map seen
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub results: RawResults,
    pub complete: bool,
    pub termination: PollTermination,
    pub rounds: u32,
    pub elapsed: Duration,
}

/// Submits checks and polls for their results
pub struct CheckExecutor {
    transport: Arc<dyn CheckTransport>,
    directory: NodeDirectory,
    config: ExecutionConfig,
    logger: PollLogger,
}

impl CheckExecutor {
    pub fn new(transport: Arc<dyn CheckTransport>, config: ExecutionConfig, logger: PollLogger) -> Self {
        Self {
            transport,
            directory: NodeDirectory::new(),
            config,
            logger,
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Submit a job; resolves to `AppError::Cancelled` if interrupted first
    pub async fn submit(&self, job: &CheckJob, cancel: &mut CancelSignal) -> Result<JobHandle> {
        if cancel.is_cancelled() {
            return Err(AppError::cancelled("check was not submitted"));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::cancelled("interrupted while submitting the check")),
            handle = self.transport.submit(job) => handle,
        }
    }

    /// Poll until complete, timed out, failed or cancelled.
    ///
    /// Every fetch and every sleep is raced against the deadline and the
    /// cancel signal, so this returns within `timeout + poll_interval`.
    pub async fn poll_until_complete(
        &self,
        handle: &JobHandle,
        expected_node_count: usize,
        timeout: Duration,
        poll_interval: Duration,
        cancel: &mut CancelSignal,
    ) -> PollOutcome {
        let started = Instant::now();
        let deadline = started + timeout;
        let mut last_seen = RawResults::new();
        let mut rounds: u32 = 0;

        let termination = loop {
            if cancel.is_cancelled() {
                break PollTermination::Cancelled;
            }
            if Instant::now() >= deadline {
                break PollTermination::TimedOut;
            }

            rounds += 1;
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => break PollTermination::Cancelled,
                _ = tokio::time::sleep_until(deadline) => break PollTermination::TimedOut,
                fetched = self.transport.fetch_results(&handle.request_id) => fetched,
            };

            match fetched {
                Ok(raw) => last_seen = raw,
                Err(e) => {
                    self.logger.log_fetch_failure(&e, rounds).await;
                    break PollTermination::TransportFailed(e.to_string());
                }
            }

            let pending = last_seen.pending_count(expected_node_count);
            self.logger
                .log_poll_round(rounds, pending, expected_node_count, started.elapsed().as_millis())
                .await;
            if pending == 0 {
                break PollTermination::Complete;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break PollTermination::TimedOut;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break PollTermination::Cancelled,
                _ = tokio::time::sleep(poll_interval.min(remaining)) => {}
            }
        };

        let complete = termination == PollTermination::Complete;
        self.logger
            .log_poll_outcome(
                termination.as_str(),
                last_seen.iter().filter(|(_, state)| !state.is_pending()).count(),
                last_seen.pending_count(expected_node_count),
                rounds,
            )
            .await;

        PollOutcome {
            results: last_seen,
            complete,
            termination,
            rounds,
            elapsed: started.elapsed(),
        }
    }

    /// Submit, poll, normalize and aggregate one check.
    ///
    /// A partial map after a timeout, failure or cancel still yields a report
    /// with `complete == false`; only a run that produced no node data at all
    /// turns a failure or cancel into an error.
    pub async fn run(&self, job: &CheckJob, cancel: &mut CancelSignal) -> Result<Report> {
        let handle = self.submit(job, cancel).await?;
        self.collect(job, &handle, cancel).await
    }

    /// Poll an already submitted job and build its report
    pub async fn collect(&self, job: &CheckJob, handle: &JobHandle, cancel: &mut CancelSignal) -> Result<Report> {
        self.logger.log_submission(job, handle).await;

        let outcome = self
            .poll_until_complete(
                handle,
                job.node_count(),
                self.config.poll_timeout,
                self.config.poll_interval,
                cancel,
            )
            .await;

        let has_data = outcome.results.iter().any(|(_, state)| !state.is_pending());
        match &outcome.termination {
            PollTermination::TransportFailed(message) if !has_data => {
                return Err(AppError::transport(format!("fetching results failed: {}", message)));
            }
            PollTermination::Cancelled if !has_data => {
                return Err(AppError::cancelled("interrupted before any node reported"));
            }
            _ => {}
        }

        let node_results = normalize_all(job.check_type(), &self.directory, &outcome.results);
        let pending_nodes = outcome.results.pending_nodes(job.requested_nodes());

        Ok(Report::assemble(job, handle, outcome.complete, pending_nodes, node_results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use crate::types::CheckType;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport that replays scripted fetch results, repeating the last one
    struct ScriptedTransport {
        fetches: Mutex<VecDeque<Result<RawResults>>>,
        last: Mutex<Option<RawResults>>,
        fetch_delay: Duration,
        submit_delay: Duration,
        fetch_count: Mutex<u32>,
    }

    impl ScriptedTransport {
        fn new(fetches: Vec<Result<RawResults>>) -> Self {
            Self {
                fetches: Mutex::new(fetches.into_iter().collect()),
                last: Mutex::new(None),
                fetch_delay: Duration::ZERO,
                submit_delay: Duration::ZERO,
                fetch_count: Mutex::new(0),
            }
        }

        fn with_fetch_delay(mut self, delay: Duration) -> Self {
            self.fetch_delay = delay;
            self
        }

        fn with_submit_delay(mut self, delay: Duration) -> Self {
            self.submit_delay = delay;
            self
        }

        fn fetch_count(&self) -> u32 {
            *self.fetch_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl CheckTransport for ScriptedTransport {
        async fn submit(&self, _job: &CheckJob) -> Result<JobHandle> {
            tokio::time::sleep(self.submit_delay).await;
            Ok(JobHandle {
                request_id: "req-1".to_string(),
                permanent_link: "https://check-host.net/check-report/req-1".to_string(),
            })
        }

        async fn fetch_results(&self, _request_id: &str) -> Result<RawResults> {
            *self.fetch_count.lock().unwrap() += 1;
            tokio::time::sleep(self.fetch_delay).await;

            let next = self.fetches.lock().unwrap().pop_front();
            match next {
                Some(Ok(raw)) => {
                    *self.last.lock().unwrap() = Some(raw.clone());
                    Ok(raw)
                }
                Some(Err(e)) => Err(e),
                None => Ok(self.last.lock().unwrap().clone().unwrap_or_default()),
            }
        }
    }

    fn raw(value: serde_json::Value) -> RawResults {
        RawResults::from_value(value).unwrap()
    }

    fn executor(transport: Arc<dyn CheckTransport>, timeout: Duration, interval: Duration) -> CheckExecutor {
        CheckExecutor::new(
            transport,
            ExecutionConfig { poll_timeout: timeout, poll_interval: interval },
            PollLogger::from_logger(Logger::quiet("POLL")),
        )
    }

    fn handle() -> JobHandle {
        JobHandle { request_id: "req-1".to_string(), permanent_link: String::new() }
    }

    fn ping_job() -> CheckJob {
        CheckJob::new(
            CheckType::Ping,
            "example.com",
            vec!["de1.node.check-host.net", "us1.node.check-host.net"],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_completes_when_all_nodes_report() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(raw(json!({"de1.node.check-host.net": null, "us1.node.check-host.net": null}))),
            Ok(raw(json!({
                "de1.node.check-host.net": [[["OK", 0.01, "1.1.1.1"]]],
                "us1.node.check-host.net": null
            }))),
            Ok(raw(json!({
                "de1.node.check-host.net": [[["OK", 0.01, "1.1.1.1"]]],
                "us1.node.check-host.net": [[["OK", 0.03, "1.1.1.1"]]]
            }))),
        ]));
        let exec = executor(transport.clone(), Duration::from_secs(5), Duration::from_millis(10));

        let outcome = exec
            .poll_until_complete(&handle(), 2, Duration::from_secs(5), Duration::from_millis(10), &mut CancelSignal::never())
            .await;

        assert!(outcome.complete);
        assert_eq!(outcome.termination, PollTermination::Complete);
        assert_eq!(outcome.rounds, 3);
        assert_eq!(transport.fetch_count(), 3);
        assert_eq!(outcome.results.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_node_keeps_polling() {
        // One of two expected nodes is absent from the map, so the first snapshot is incomplete
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(raw(json!({"de1.node.check-host.net": [[["OK", 0.01]]]}))),
            Ok(raw(json!({
                "de1.node.check-host.net": [[["OK", 0.01]]],
                "us1.node.check-host.net": [[["OK", 0.02]]]
            }))),
        ]));
        let exec = executor(transport, Duration::from_secs(5), Duration::from_millis(10));

        let outcome = exec
            .poll_until_complete(&handle(), 2, Duration::from_secs(5), Duration::from_millis(10), &mut CancelSignal::never())
            .await;

        assert!(outcome.complete);
        assert_eq!(outcome.rounds, 2);
    }

    #[tokio::test]
    async fn test_timeout_returns_partial_results() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(raw(json!({
            "de1.node.check-host.net": [[["OK", 0.01]]],
            "us1.node.check-host.net": null
        })))]));
        let exec = executor(transport, Duration::from_millis(300), Duration::from_millis(100));

        let started = std::time::Instant::now();
        let outcome = exec
            .poll_until_complete(&handle(), 2, Duration::from_millis(300), Duration::from_millis(100), &mut CancelSignal::never())
            .await;
        let elapsed = started.elapsed();

        assert!(!outcome.complete);
        assert_eq!(outcome.termination, PollTermination::TimedOut);
        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.rounds >= 2);
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(300 + 100 + 500), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_slow_fetch_cannot_outlive_deadline() {
        let transport = Arc::new(
            ScriptedTransport::new(vec![Ok(raw(json!({})))]).with_fetch_delay(Duration::from_secs(30)),
        );
        let exec = executor(transport, Duration::from_millis(200), Duration::from_millis(50));

        let started = std::time::Instant::now();
        let outcome = exec
            .poll_until_complete(&handle(), 2, Duration::from_millis(200), Duration::from_millis(50), &mut CancelSignal::never())
            .await;

        assert_eq!(outcome.termination, PollTermination::TimedOut);
        assert!(outcome.results.is_empty());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_fetch_failure_returns_last_partial_map() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(raw(json!({"de1.node.check-host.net": [[["OK", 0.01]]], "us1.node.check-host.net": null}))),
            Err(AppError::transport("connection reset")),
        ]));
        let exec = executor(transport.clone(), Duration::from_secs(5), Duration::from_millis(10));

        let outcome = exec
            .poll_until_complete(&handle(), 2, Duration::from_secs(5), Duration::from_millis(10), &mut CancelSignal::never())
            .await;

        assert!(!outcome.complete);
        assert!(matches!(outcome.termination, PollTermination::TransportFailed(ref m) if m.contains("connection reset")));
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(transport.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_in_flight_fetch() {
        let transport = Arc::new(
            ScriptedTransport::new(vec![Ok(raw(json!({})))]).with_fetch_delay(Duration::from_secs(30)),
        );
        let exec = executor(transport, Duration::from_secs(30), Duration::from_secs(2));
        let (tx, mut cancel) = CancelSignal::new();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        let started = std::time::Instant::now();
        let outcome = exec
            .poll_until_complete(&handle(), 2, Duration::from_secs(30), Duration::from_secs(2), &mut cancel)
            .await;

        assert_eq!(outcome.termination, PollTermination::Cancelled);
        assert!(!outcome.complete);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_cancel_during_sleep_keeps_partial_map() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(raw(json!({
            "de1.node.check-host.net": [[["OK", 0.01]]],
            "us1.node.check-host.net": null
        })))]));
        let exec = executor(transport, Duration::from_secs(30), Duration::from_secs(10));
        let (tx, mut cancel) = CancelSignal::new();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = tx.send(true);
        });

        let started = std::time::Instant::now();
        let outcome = exec
            .poll_until_complete(&handle(), 2, Duration::from_secs(30), Duration::from_secs(10), &mut cancel)
            .await;

        assert_eq!(outcome.termination, PollTermination::Cancelled);
        assert_eq!(outcome.results.len(), 2);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_run_builds_report() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(raw(json!({
            "de1.node.check-host.net": [[["OK", 0.010, "1.1.1.1"], ["OK", 0.030, "1.1.1.1"]]],
            "us1.node.check-host.net": [[["TIMEOUT", 3.0], ["TIMEOUT", 3.0]]]
        })))]));
        let exec = executor(transport, Duration::from_secs(5), Duration::from_millis(10));

        let report = exec.run(&ping_job(), &mut CancelSignal::never()).await.unwrap();

        assert!(report.complete);
        assert!(report.pending_nodes.is_empty());
        assert_eq!(report.request_id, "req-1");
        assert_eq!(report.node_results.len(), 2);
        assert_eq!(report.overall_stats.successes, 2);
        assert_eq!(report.overall_stats.attempts, 4);
        assert!((report.overall_stats.latency_avg_ms - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_run_partial_report_lists_pending_nodes() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(raw(json!({
            "de1.node.check-host.net": [[["OK", 0.010, "1.1.1.1"]]],
            "us1.node.check-host.net": null
        })))]));
        let exec = executor(transport, Duration::from_millis(150), Duration::from_millis(50));

        let report = exec.run(&ping_job(), &mut CancelSignal::never()).await.unwrap();

        assert!(!report.complete);
        assert_eq!(report.pending_nodes, vec!["us1.node.check-host.net".to_string()]);
        assert_eq!(report.node_results.len(), 1);
    }

    #[tokio::test]
    async fn test_run_fails_when_no_data_before_transport_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(AppError::transport("HTTP 503"))]));
        let exec = executor(transport, Duration::from_secs(5), Duration::from_millis(10));

        let err = exec.run(&ping_job(), &mut CancelSignal::never()).await.unwrap_err();
        assert_eq!(err.category(), "TRANSPORT");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_cancel_during_submit() {
        let transport = Arc::new(
            ScriptedTransport::new(vec![]).with_submit_delay(Duration::from_secs(30)),
        );
        let exec = executor(transport, Duration::from_secs(5), Duration::from_millis(10));
        let (tx, mut cancel) = CancelSignal::new();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        let err = exec.run(&ping_job(), &mut cancel).await.unwrap_err();
        assert_eq!(err.category(), "CANCELLED");
        assert_eq!(err.exit_code(), 130);
    }

    #[test]
    fn test_execution_config_from_config() {
        let config = Config { poll_timeout_seconds: 45, poll_interval_seconds: 3, ..Default::default() };
        let exec_config = ExecutionConfig::from(&config);
        assert_eq!(exec_config.poll_timeout, Duration::from_secs(45));
        assert_eq!(exec_config.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(PollTermination::TimedOut.to_string(), "timed out");
        assert_eq!(
            PollTermination::TransportFailed("HTTP 500".to_string()).to_string(),
            "transport failure: HTTP 500"
        );
    }
}
