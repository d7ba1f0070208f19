//! JSON summary export for a finished run.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use super::collector::{LatencyStats, MetricsCollector};
use super::types::{IterationCounts, RequestCounts, ServerMemory};
use crate::thresholds::{ThresholdReport, ThresholdResult};

/// Everything a run produced, in a machine-readable shape.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub profile: String,
    pub finished_at: String,
    pub duration_seconds: f64,
    pub requests: RequestCounts,
    pub iterations: IterationCounts,
    pub latency_ms: LatencyStats,
    pub request_failure_rate: f64,
    pub check_failure_rate: f64,
    pub checks: Vec<CheckSummary>,
    pub server_memory: ServerMemory,
    pub thresholds: Vec<ThresholdResult>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

impl RunSummary {
    pub fn build(
        profile: &str,
        collector: &MetricsCollector,
        thresholds: &ThresholdReport,
    ) -> Self {
        let metrics = collector.get_snapshot();
        let checks = metrics
            .checks
            .iter()
            .map(|(name, counts)| CheckSummary {
                name: (*name).to_string(),
                passed: counts.passed,
                failed: counts.failed,
                pass_rate: counts.pass_rate(),
            })
            .collect();

        Self {
            profile: profile.to_string(),
            finished_at: chrono::Utc::now().to_rfc3339(),
            duration_seconds: collector.elapsed().as_secs_f64(),
            requests: metrics.requests,
            iterations: metrics.iterations,
            latency_ms: collector.latency_percentiles(),
            request_failure_rate: collector.request_failure_rate(),
            check_failure_rate: collector.check_failure_rate(),
            checks,
            server_memory: metrics.server_memory,
            thresholds: thresholds.results.clone(),
            passed: thresholds.passed(),
        }
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::{evaluate, Threshold};
    use reqwest::StatusCode;

    #[test]
    fn summary_reflects_collector_state() {
        let collector = MetricsCollector::new();
        collector.request_started();
        collector.request_completed(StatusCode::CREATED, 42);
        collector.iteration_finished(&[("status_is_201", true)]);

        let report = evaluate(&[Threshold::DurationP95Under { max_ms: 2000 }], &collector);
        let summary = RunSummary::build("ramp", &collector, &report);

        assert_eq!(summary.profile, "ramp");
        assert_eq!(summary.requests.started, 1);
        assert_eq!(summary.iterations.total, 1);
        assert_eq!(summary.checks.len(), 1);
        assert_eq!(summary.checks[0].name, "status_is_201");
        assert!(summary.passed);
    }

    #[test]
    fn summary_serialises_to_json() {
        let collector = MetricsCollector::new();
        collector.request_started();
        collector.request_completed(StatusCode::TOO_MANY_REQUESTS, 7);
        collector.iteration_finished(&[("status_is_201_or_429", true)]);

        let report = evaluate(
            &[Threshold::RequestFailureRateUnder { max: 0.10 }],
            &collector,
        );
        let summary = RunSummary::build("spike", &collector, &report);
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&summary).unwrap()).unwrap();

        assert_eq!(json["profile"], "spike");
        assert_eq!(json["requests"]["shed"], 1);
        assert_eq!(json["thresholds"][0]["passed"], false);
    }
}
