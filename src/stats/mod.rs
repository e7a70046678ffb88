//! Per-region and overall statistics over normalized node results


use crate::models::NormalizedNodeResult;
use crate::normalize::summarize;
use crate::types::Region;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate figures for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub region: Region,
    /// Number of nodes that reported in this region
    pub nodes: usize,
    pub successes: u32,
    pub attempts: u32,
    pub latency_min_ms: f64,
    pub latency_avg_ms: f64,
    pub latency_max_ms: f64,
}

impl RegionStats {
    pub fn success_rate(&self) -> f64 {
        success_rate(self.successes, self.attempts)
    }
}

/// Aggregate figures across every reported node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub nodes: usize,
    pub successes: u32,
    pub attempts: u32,
    pub latency_min_ms: f64,
    pub latency_avg_ms: f64,
    pub latency_max_ms: f64,
}

impl OverallStats {
    pub fn success_rate(&self) -> f64 {
        success_rate(self.successes, self.attempts)
    }
}

fn success_rate(successes: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        0.0
    } else {
        successes as f64 / attempts as f64 * 100.0
    }
}

/// Running totals for one region
#[derive(Debug, Clone, Default)]
struct RegionAccumulator {
    nodes: usize,
    successes: u32,
    attempts: u32,
    samples_ms: Vec<f64>,
}

impl RegionAccumulator {
    fn add(&mut self, result: &NormalizedNodeResult) {
        self.nodes += 1;
        self.successes += result.attempts_succeeded;
        self.attempts += result.attempts_total;
        self.samples_ms.extend_from_slice(&result.samples_ms);
    }
}

/// Stateless aggregation over a set of node results
pub struct StatisticsEngine;

impl StatisticsEngine {
    /// Compute region statistics (regions with at least one node) and overall statistics
    pub fn aggregate(results: &[NormalizedNodeResult]) -> (BTreeMap<Region, RegionStats>, OverallStats) {
        let mut accumulators: BTreeMap<Region, RegionAccumulator> = Region::ALL
            .iter()
            .map(|region| (*region, RegionAccumulator::default()))
            .collect();

        for result in results {
            if let Some(acc) = accumulators.get_mut(&result.region) {
                acc.add(result);
            }
        }

        let mut overall = RegionAccumulator::default();
        let mut region_stats = BTreeMap::new();

        for (region, acc) in &accumulators {
            if acc.nodes == 0 {
                continue;
            }

            overall.nodes += acc.nodes;
            overall.successes += acc.successes;
            overall.attempts += acc.attempts;
            overall.samples_ms.extend_from_slice(&acc.samples_ms);

            let (min, avg, max) = summarize(&acc.samples_ms);
            region_stats.insert(
                *region,
                RegionStats {
                    region: *region,
                    nodes: acc.nodes,
                    successes: acc.successes,
                    attempts: acc.attempts,
                    latency_min_ms: min,
                    latency_avg_ms: avg,
                    latency_max_ms: max,
                },
            );
        }

        let (min, avg, max) = summarize(&overall.samples_ms);
        let overall_stats = OverallStats {
            nodes: overall.nodes,
            successes: overall.successes,
            attempts: overall.attempts,
            latency_min_ms: min,
            latency_avg_ms: avg,
            latency_max_ms: max,
        };

        (region_stats, overall_stats)
    }

    /// Stable sort by region tag, then country, then city
    pub fn sort_for_display(results: &mut [NormalizedNodeResult]) {
        results.sort_by(|a, b| {
            a.region
                .as_str()
                .cmp(b.region.as_str())
                .then_with(|| a.country.cmp(&b.country))
                .then_with(|| a.city.cmp(&b.city))
        });
    }

    /// Region with the lowest average latency among regions with successes
    pub fn fastest_region(region_stats: &BTreeMap<Region, RegionStats>) -> Option<&RegionStats> {
        region_stats
            .values()
            .filter(|stats| stats.successes > 0)
            .min_by(|a, b| {
                a.latency_avg_ms
                    .partial_cmp(&b.latency_avg_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
