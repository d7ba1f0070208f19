//! Console reporter for metrics with real-time updates

use super::collector::MetricsCollector;
use crate::thresholds::ThresholdReport;
use std::io::{self, Write};
use tokio::time::{interval, Duration};

/// Start periodic metrics reporting (every N seconds)
pub async fn start_periodic_reporter(collector: MetricsCollector, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;

        // Update system metrics before printing
        collector.update_system_metrics();

        print_live_metrics(&collector);
    }
}

/// Print live metrics (clears screen and updates in place)
pub fn print_live_metrics(collector: &MetricsCollector) {
    // Clear screen and move cursor to top
    print!("\x1B[2J\x1B[1;1H");

    let metrics = collector.get_snapshot();
    let elapsed = collector.elapsed_seconds();
    let latency = collector.latency_percentiles();

    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║            Ticketero Load Test - Live Metrics                  ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    println!(
        "\n⏱️  Elapsed Time: {:02}:{:02}:{:02}",
        elapsed / 3600,
        (elapsed % 3600) / 60,
        elapsed % 60
    );

    println!("\n┌─ REQUESTS ──────────────────────────────────────────────────┐");
    println!(
        "│  Started:      {:>8}    In-Flight:  {:>8}              │",
        metrics.requests.started, metrics.requests.in_flight
    );
    println!(
        "│  Completed:    {:>8}    Errored:    {:>8}              │",
        metrics.requests.completed, metrics.requests.failed
    );
    println!(
        "│  HTTP 4xx/5xx: {:>8}    Shed (429): {:>8}              │",
        metrics.requests.http_failed, metrics.requests.shed
    );

    if metrics.requests.started > 0 {
        let failure_rate = collector.request_failure_rate() * 100.0;
        let throughput = if elapsed > 0 {
            metrics.requests.completed as f64 / elapsed as f64
        } else {
            0.0
        };
        println!(
            "│  Failure Rate: {:>7.2}%    Throughput: {:>7.2}/sec        │",
            failure_rate, throughput
        );
    }
    println!("└─────────────────────────────────────────────────────────────┘");

    if latency.count > 0 {
        println!("\n┌─ REQUEST LATENCY (ms) ──────────────────────────────────────┐");
        println!(
            "│  Min: {:>6}  P50: {:>6}  P95: {:>6}  P99: {:>6}  Max: {:>6}│",
            latency.min, latency.p50, latency.p95, latency.p99, latency.max
        );
        println!(
            "│  Mean: {:>8.2} ms    Count: {:>10}                    │",
            latency.mean, latency.count
        );
        println!("└─────────────────────────────────────────────────────────────┘");
    }

    if !metrics.checks.is_empty() {
        println!("\n┌─ CHECKS ────────────────────────────────────────────────────┐");
        for (name, counts) in &metrics.checks {
            println!(
                "│  {:<28} {:>7.2}%  ({:>7}/{:<7})     │",
                name,
                counts.pass_rate() * 100.0,
                counts.passed,
                counts.total()
            );
        }
        println!("└─────────────────────────────────────────────────────────────┘");
    }

    println!("\n┌─ SYSTEM ────────────────────────────────────────────────────┐");
    println!(
        "│  CPU Usage:    {:>6.1}%    Memory: {:>6} / {:>6} MB       │",
        metrics.system.cpu_usage, metrics.system.memory_used_mb, metrics.system.memory_total_mb
    );
    if let Some(last) = metrics.server_memory.last {
        println!(
            "│  Server Memory: {:>6} MB (peak {:>6} MB)                  │",
            last / 1024 / 1024,
            metrics.server_memory.peak.unwrap_or(last) / 1024 / 1024
        );
    }
    println!("└─────────────────────────────────────────────────────────────┘");

    println!("\n  [Press Ctrl+C to stop test]");

    // Flush stdout to ensure immediate display
    let _ = io::stdout().flush();
}

/// Print final summary report
pub fn print_final_report(collector: &MetricsCollector, thresholds: &ThresholdReport) {
    let metrics = collector.get_snapshot();
    let elapsed = collector.elapsed_seconds();
    let latency = collector.latency_percentiles();

    println!("\n╔════════════════════════════════════════════════════════════════╗");
    println!("║                    FINAL TEST REPORT                           ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    println!("\n📊 REQUESTS");
    println!("   Total Started:        {:>10}", metrics.requests.started);
    println!("   Total Completed:      {:>10}", metrics.requests.completed);
    println!("   Transport Errors:     {:>10}", metrics.requests.failed);
    println!("   HTTP 4xx/5xx:         {:>10}", metrics.requests.http_failed);
    println!("   Shed (429):           {:>10}", metrics.requests.shed);

    if elapsed > 0 {
        let throughput = metrics.requests.completed as f64 / elapsed as f64;
        println!("   Throughput:           {:>10.2} requests/sec", throughput);
    }

    if metrics.requests.started > 0 {
        let failure_rate = collector.request_failure_rate() * 100.0;
        println!("   Failure Rate:         {:>10.2}%", failure_rate);
    }

    if latency.count > 0 {
        println!("\n📈 REQUEST LATENCY");
        println!("   Min:                  {:>10} ms", latency.min);
        println!("   P50 (Median):         {:>10} ms", latency.p50);
        println!("   P95:                  {:>10} ms", latency.p95);
        println!("   P99:                  {:>10} ms", latency.p99);
        println!("   Max:                  {:>10} ms", latency.max);
        println!("   Mean:                 {:>10.2} ms", latency.mean);
    }

    if !metrics.checks.is_empty() {
        println!("\n✅ CHECKS");
        for (name, counts) in &metrics.checks {
            println!(
                "   {:<28} {:>7.2}%  ({}/{})",
                name,
                counts.pass_rate() * 100.0,
                counts.passed,
                counts.total()
            );
        }
    }

    if let Some(peak) = metrics.server_memory.peak {
        println!("\n💾 SERVER MEMORY");
        println!("   Peak Reported:        {:>10} MB", peak / 1024 / 1024);
    }

    if !thresholds.results.is_empty() {
        println!("\n🎯 THRESHOLDS");
        for result in &thresholds.results {
            println!(
                "   [{}] {} {} (observed {})",
                if result.passed { "PASS" } else { "FAIL" },
                result.metric,
                result.constraint,
                result.observed_display()
            );
        }
    }

    println!("\n⏱️  Test Duration: {:.2} seconds", elapsed);
    println!("════════════════════════════════════════════════════════════════\n");
}
