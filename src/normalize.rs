//! Conversion of raw node payloads into `NormalizedNodeResult`
//!
//! Both check types share the same output contract. A node whose payload is
//! pending, empty or structurally unusable is skipped rather than reported
//! with made-up figures.

use crate::models::{HttpAttempt, HttpOutcome, NodeState, NormalizedNodeResult, PingAttempt, RawResults};
use crate::nodes::NodeDirectory;
use crate::types::CheckType;
use serde_json::Value;

/// Normalize every node in a result snapshot with the variant for `check_type`
pub fn normalize_all(
    check_type: CheckType,
    directory: &NodeDirectory,
    raw: &RawResults,
) -> Vec<NormalizedNodeResult> {
    raw.iter()
        .filter_map(|(node_id, state)| match check_type {
            CheckType::Ping => normalize_ping(directory, node_id, state),
            CheckType::Http => normalize_http(directory, node_id, state),
        })
        .collect()
}

/// Normalize a ping payload `[[attempt, attempt, ...]]`
pub fn normalize_ping(
    directory: &NodeDirectory,
    node_id: &str,
    state: &NodeState,
) -> Option<NormalizedNodeResult> {
    let raw_attempts = first_entry(state)?.as_array()?;

    // The first attempt decides whether the node produced anything usable
    PingAttempt::from_value(raw_attempts.first()?)?;

    let attempts: Vec<PingAttempt> = raw_attempts
        .iter()
        .map(|value| {
            PingAttempt::from_value(value).unwrap_or(PingAttempt {
                status: String::new(),
                elapsed_secs: None,
                ip: None,
            })
        })
        .collect();

    let successful: Vec<&PingAttempt> = attempts.iter().filter(|a| a.is_success()).collect();
    let samples: Vec<f64> = successful.iter().filter_map(|a| a.latency_ms()).collect();
    let ip = successful
        .first()
        .and_then(|a| a.ip.clone())
        .unwrap_or_else(|| "N/A".to_string());

    let (min, avg, max) = summarize(&samples);
    let info = directory.lookup(node_id);

    Some(NormalizedNodeResult {
        node_id: node_id.to_string(),
        country: info.country,
        city: info.city,
        region: info.region,
        attempts_succeeded: successful.len() as u32,
        attempts_total: attempts.len() as u32,
        latency_min_ms: min,
        latency_avg_ms: avg,
        latency_max_ms: max,
        ip,
        http: None,
        samples_ms: samples,
    })
}

/// Normalize an HTTP payload `[[success, elapsed, message, code?, ip?]]`
pub fn normalize_http(
    directory: &NodeDirectory,
    node_id: &str,
    state: &NodeState,
) -> Option<NormalizedNodeResult> {
    let attempt = HttpAttempt::from_value(first_entry(state)?)?;
    let response_time_ms = attempt.response_time_ms();
    let samples = if attempt.success { vec![response_time_ms] } else { Vec::new() };
    let (min, avg, max) = summarize(&samples);
    let info = directory.lookup(node_id);

    Some(NormalizedNodeResult {
        node_id: node_id.to_string(),
        country: info.country,
        city: info.city,
        region: info.region,
        attempts_succeeded: u32::from(attempt.success),
        attempts_total: 1,
        latency_min_ms: min,
        latency_avg_ms: avg,
        latency_max_ms: max,
        ip: attempt.ip,
        http: Some(HttpOutcome {
            success: attempt.success,
            response_time_ms,
            status_code: attempt.status_code,
            status_message: attempt.status_message,
        }),
        samples_ms: samples,
    })
}

/// First element of a ready, non-empty array payload
fn first_entry(state: &NodeState) -> Option<&Value> {
    let payload = state.payload()?.as_array()?;
    payload.first().filter(|entry| match entry {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        _ => true,
    })
}

/// (min, avg, max) of a sample, all zero when empty
pub(crate) fn summarize(samples: &[f64]) -> (f64, f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let avg = samples.iter().sum::<f64>() / samples.len() as f64;
    (min, avg, max)
}
