//! End-of-run pass/fail bounds on aggregate metrics.

use serde::Serialize;

use crate::metrics::MetricsCollector;

/// A bound evaluated against the collector once the run has drained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// 95th-percentile request latency strictly under the bound (ms).
    DurationP95Under { max_ms: u64 },
    /// Request failure rate (transport errors + 4xx/5xx) strictly under the
    /// bound (0.0..1.0).
    RequestFailureRateUnder { max: f64 },
    /// Check failure rate across iterations strictly under the bound.
    CheckFailureRateUnder { max: f64 },
}

impl Threshold {
    pub fn evaluate(&self, collector: &MetricsCollector) -> ThresholdResult {
        match *self {
            Threshold::DurationP95Under { max_ms } => {
                let observed = collector.latency_percentiles().p95 as f64;
                ThresholdResult {
                    metric: "request_duration",
                    constraint: format!("p(95)<{max_ms}ms"),
                    observed,
                    passed: observed < max_ms as f64,
                }
            }
            Threshold::RequestFailureRateUnder { max } => {
                let observed = collector.request_failure_rate();
                ThresholdResult {
                    metric: "request_failure_rate",
                    constraint: format!("rate<{max}"),
                    observed,
                    passed: observed < max,
                }
            }
            Threshold::CheckFailureRateUnder { max } => {
                let observed = collector.check_failure_rate();
                ThresholdResult {
                    metric: "check_failure_rate",
                    constraint: format!("rate<{max}"),
                    observed,
                    passed: observed < max,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdResult {
    pub metric: &'static str,
    pub constraint: String,
    pub observed: f64,
    pub passed: bool,
}

impl ThresholdResult {
    /// Human-readable observed value, in the unit of the constraint.
    pub fn observed_display(&self) -> String {
        match self.metric {
            "request_duration" => format!("{:.0}ms", self.observed),
            _ => format!("{:.4}", self.observed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdReport {
    pub results: Vec<ThresholdResult>,
}

impl ThresholdReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }
}

pub fn evaluate(thresholds: &[Threshold], collector: &MetricsCollector) -> ThresholdReport {
    ThresholdReport {
        results: thresholds.iter().map(|t| t.evaluate(collector)).collect(),
    }
}
