//! Metric types

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestCounts {
    /// Requests issued.
    pub started: usize,
    /// Requests that produced any HTTP response.
    pub completed: usize,
    /// Transport errors and timeouts (no response).
    pub failed: usize,
    /// Responses with a 4xx/5xx status; subset of `completed`.
    pub http_failed: usize,
    /// 429 responses; subset of `http_failed`.
    pub shed: usize,
    #[serde(skip)]
    pub in_flight: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IterationCounts {
    /// Virtual-user iterations finished.
    pub total: usize,
    /// Iterations where at least one check failed, or the request errored.
    pub check_failed: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CheckCounts {
    pub passed: usize,
    pub failed: usize,
}

impl CheckCounts {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.passed as f64 / self.total() as f64
    }
}

/// Load-generator host metrics, sampled via sysinfo.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemMetrics {
    pub cpu_usage: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
}

/// Memory the service reported through its response header.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerMemory {
    pub last: Option<u64>,
    pub peak: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TestMetrics {
    pub requests: RequestCounts,
    pub iterations: IterationCounts,
    pub checks: BTreeMap<&'static str, CheckCounts>,
    pub system: SystemMetrics,
    pub server_memory: ServerMemory,
}
