//! Normalized node results and the final check report

use crate::models::check::{CheckJob, JobHandle};
use crate::stats::{OverallStats, RegionStats, StatisticsEngine};
use crate::types::{CheckType, Region};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome details specific to HTTP checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpOutcome {
    pub success: bool,
    pub response_time_ms: f64,
    pub status_code: String,
    pub status_message: String,
}

/// Uniform per-node result shared by ping and HTTP checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedNodeResult {
    pub node_id: String,
    pub country: String,
    pub city: String,
    pub region: Region,
    pub attempts_succeeded: u32,
    pub attempts_total: u32,
    /// Latency figures are 0 when no attempt succeeded
    pub latency_min_ms: f64,
    pub latency_avg_ms: f64,
    pub latency_max_ms: f64,
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpOutcome>,
    /// Latency of every successful attempt, feeds the region statistics
    #[serde(default, skip_serializing)]
    pub samples_ms: Vec<f64>,
}

impl NormalizedNodeResult {
    pub fn success_rate(&self) -> f64 {
        if self.attempts_total == 0 {
            0.0
        } else {
            self.attempts_succeeded as f64 / self.attempts_total as f64 * 100.0
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.attempts_succeeded > 0
    }
}

/// Immutable record of one check run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub check_type: CheckType,
    pub target_host: String,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub permanent_link: String,
    /// False when polling stopped before every node reported
    pub complete: bool,
    pub pending_nodes: Vec<String>,
    pub node_results: Vec<NormalizedNodeResult>,
    pub region_stats: BTreeMap<Region, RegionStats>,
    pub overall_stats: OverallStats,
}

impl Report {
    /// Sort the node results for display and attach aggregate statistics
    pub fn assemble(
        job: &CheckJob,
        handle: &JobHandle,
        complete: bool,
        pending_nodes: Vec<String>,
        mut node_results: Vec<NormalizedNodeResult>,
    ) -> Self {
        StatisticsEngine::sort_for_display(&mut node_results);
        let (region_stats, overall_stats) = StatisticsEngine::aggregate(&node_results);

        Self {
            check_type: job.check_type(),
            target_host: job.target_host().to_string(),
            timestamp: Utc::now(),
            request_id: handle.request_id.clone(),
            permanent_link: handle.permanent_link.clone(),
            complete,
            pending_nodes,
            node_results,
            region_stats,
            overall_stats,
        }
    }

    pub fn reported_node_count(&self) -> usize {
        self.node_results.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(node_id: &str, region: Region, country: &str, samples: &[f64], total: u32) -> NormalizedNodeResult {
        let succeeded = samples.len() as u32;
        let (min, avg, max) = if samples.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                samples.iter().cloned().fold(f64::INFINITY, f64::min),
                samples.iter().sum::<f64>() / samples.len() as f64,
                samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            )
        };
        NormalizedNodeResult {
            node_id: node_id.to_string(),
            country: country.to_string(),
            city: "City".to_string(),
            region,
            attempts_succeeded: succeeded,
            attempts_total: total,
            latency_min_ms: min,
            latency_avg_ms: avg,
            latency_max_ms: max,
            ip: "N/A".to_string(),
            http: None,
            samples_ms: samples.to_vec(),
        }
    }

    #[test]
    fn test_assemble_sorts_and_aggregates() {
        let job = CheckJob::new(CheckType::Ping, "example.com", vec!["n1", "n2"]).unwrap();
        let handle = JobHandle {
            request_id: "req-1".to_string(),
            permanent_link: "https://check-host.net/check-report/req-1".to_string(),
        };

        let results = vec![
            node("n2", Region::Na, "USA", &[30.0], 4),
            node("n1", Region::Eu, "Germany", &[10.0, 20.0], 4),
        ];

        let report = Report::assemble(&job, &handle, true, Vec::new(), results);

        assert_eq!(report.node_results[0].node_id, "n1");
        assert_eq!(report.region_stats.len(), 2);
        assert_eq!(report.overall_stats.successes, 3);
        assert_eq!(report.overall_stats.attempts, 8);
        assert!((report.overall_stats.latency_avg_ms - 20.0).abs() < 1e-9);
        assert_eq!(report.request_id, "req-1");
        assert!(report.complete);
    }

    #[test]
    fn test_samples_not_serialized() {
        let result = node("n1", Region::Eu, "Germany", &[10.0], 1);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("samples_ms").is_none());
        assert!(json.get("http").is_none());
        assert_eq!(json["region"], "EU");
    }

    #[test]
    fn test_success_rate() {
        let result = node("n1", Region::Eu, "Germany", &[10.0, 12.0, 11.0], 4);
        assert!((result.success_rate() - 75.0).abs() < 1e-9);
        assert!(result.is_reachable());

        let dead = node("n2", Region::Eu, "Germany", &[], 0);
        assert_eq!(dead.success_rate(), 0.0);
        assert!(!dead.is_reachable());
    }
}
