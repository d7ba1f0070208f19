//! Metrics collector - thread-safe collection with latency tracking

use super::types::TestMetrics;
use hdrhistogram::Histogram;
use parking_lot::RwLock;
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

#[derive(Clone)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<TestMetrics>>,
    latencies: Arc<RwLock<Histogram<u64>>>,
    system: Arc<RwLock<System>>,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> Self {
        // Histogram with 3 significant digits of precision
        let latency_hist = Histogram::new(3).expect("Failed to create latency histogram");

        // Initialize system monitor
        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );

        Self {
            metrics: Arc::new(RwLock::new(TestMetrics::default())),
            latencies: Arc::new(RwLock::new(latency_hist)),
            system: Arc::new(RwLock::new(system)),
            start_time: Instant::now(),
        }
    }

    pub fn request_started(&self) {
        let mut metrics = self.metrics.write();
        metrics.requests.started += 1;
        metrics.requests.in_flight += 1;
    }

    /// Record a response of any status.
    pub fn request_completed(&self, status: StatusCode, duration_ms: u64) {
        let mut metrics = self.metrics.write();
        metrics.requests.completed += 1;
        metrics.requests.in_flight = metrics.requests.in_flight.saturating_sub(1);
        if status.is_client_error() || status.is_server_error() {
            metrics.requests.http_failed += 1;
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            metrics.requests.shed += 1;
        }
        drop(metrics);

        if let Some(mut hist) = self.latencies.try_write() {
            let _ = hist.record(duration_ms);
        }
    }

    /// Record a transport error or timeout.
    pub fn request_failed(&self, duration_ms: u64) {
        let mut metrics = self.metrics.write();
        metrics.requests.failed += 1;
        metrics.requests.in_flight = metrics.requests.in_flight.saturating_sub(1);
        drop(metrics);

        // Still record latency for failed requests
        if let Some(mut hist) = self.latencies.try_write() {
            let _ = hist.record(duration_ms);
        }
    }

    /// Record one finished iteration and its check outcomes.
    pub fn iteration_finished(&self, results: &[(&'static str, bool)]) {
        let mut metrics = self.metrics.write();
        metrics.iterations.total += 1;
        let mut all_passed = true;
        for (name, passed) in results {
            let counts = metrics.checks.entry(name).or_default();
            if *passed {
                counts.passed += 1;
            } else {
                counts.failed += 1;
                all_passed = false;
            }
        }
        if !all_passed {
            metrics.iterations.check_failed += 1;
        }
    }

    /// Record an iteration whose request never produced a response.
    pub fn iteration_errored(&self) {
        let mut metrics = self.metrics.write();
        metrics.iterations.total += 1;
        metrics.iterations.check_failed += 1;
    }

    /// Record the memory usage the service reported in a response header.
    pub fn server_memory(&self, bytes: u64) {
        let mut metrics = self.metrics.write();
        metrics.server_memory.last = Some(bytes);
        let peak = metrics.server_memory.peak.unwrap_or(0);
        if bytes > peak {
            metrics.server_memory.peak = Some(bytes);
        }
    }

    /// Update system metrics (CPU, memory)
    pub fn update_system_metrics(&self) {
        let mut system = self.system.write();
        system.refresh_cpu_all();
        system.refresh_memory();

        let mut metrics = self.metrics.write();

        metrics.system.cpu_usage = system.global_cpu_usage();
        metrics.system.memory_used_mb = system.used_memory() / 1024 / 1024;
        metrics.system.memory_total_mb = system.total_memory() / 1024 / 1024;
    }

    pub fn get_snapshot(&self) -> TestMetrics {
        self.metrics.read().clone()
    }

    pub fn latency_percentiles(&self) -> LatencyStats {
        let hist = self.latencies.read();
        LatencyStats {
            min: hist.min(),
            p50: hist.value_at_quantile(0.50),
            p95: hist.value_at_quantile(0.95),
            p99: hist.value_at_quantile(0.99),
            max: hist.max(),
            mean: hist.mean(),
            count: hist.len(),
        }
    }

    /// Fraction of issued requests that errored or came back 4xx/5xx.
    pub fn request_failure_rate(&self) -> f64 {
        let metrics = self.metrics.read();
        if metrics.requests.started == 0 {
            return 0.0;
        }
        let bad = metrics.requests.failed + metrics.requests.http_failed;
        bad as f64 / metrics.requests.started as f64
    }

    /// Fraction of iterations where at least one check failed.
    pub fn check_failure_rate(&self) -> f64 {
        let metrics = self.metrics.read();
        if metrics.iterations.total == 0 {
            return 0.0;
        }
        metrics.iterations.check_failed as f64 / metrics.iterations.total as f64
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    pub min: u64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub max: u64,
    pub mean: f64,
    pub count: u64,
}
