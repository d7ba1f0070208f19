//! Shared virtual-user engine driving every traffic profile.
//!
//! A profile supplies a [`ScenarioPlan`]; the runner interpolates its staged
//! VU schedule once a second, grows and shrinks the live set of virtual-user
//! tasks to match, and drains everything before evaluating thresholds.

use std::cmp::Ordering;
use std::time::Duration;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};

use crate::checks::CheckSet;
use crate::cli::RunArgs;
use crate::client::TicketClient;
use crate::metrics::{reporter, MetricsCollector, RunSummary};
use crate::payload::PayloadSpec;
use crate::stages::StageSchedule;
use crate::thresholds::{self, Threshold, ThresholdReport};

/// Per-iteration pause simulating user pacing.
#[derive(Debug, Clone, Copy)]
pub enum ThinkTime {
    None,
    Fixed(f64),
    Uniform(f64, f64),
}

impl ThinkTime {
    fn sample<R: Rng>(&self, rng: &mut R) -> Option<Duration> {
        match *self {
            ThinkTime::None => None,
            ThinkTime::Fixed(secs) => {
                if secs <= 0.0 {
                    None
                } else {
                    Some(Duration::from_secs_f64(secs))
                }
            }
            ThinkTime::Uniform(min, max) => {
                if max <= min {
                    return Some(Duration::from_secs_f64(min.max(0.0)));
                }
                Some(Duration::from_secs_f64(rng.gen_range(min..max)))
            }
        }
    }
}

/// Everything a profile contributes: load shape, payload recipe, checks and
/// the pass/fail bounds.
#[derive(Debug, Clone)]
pub struct ScenarioPlan {
    pub name: &'static str,
    pub schedule: StageSchedule,
    pub payload: PayloadSpec,
    pub checks: CheckSet,
    pub thresholds: Vec<Threshold>,
    pub think: ThinkTime,
}

pub struct RunOutcome {
    pub thresholds: ThresholdReport,
    pub summary: RunSummary,
}

impl RunOutcome {
    pub fn passed(&self) -> bool {
        self.thresholds.passed()
    }
}

struct VirtualUser {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Run a plan to completion (or Ctrl+C), print the final report, evaluate
/// thresholds and optionally export the JSON summary.
pub async fn run(plan: ScenarioPlan, args: &RunArgs) -> Result<RunOutcome> {
    let client = TicketClient::new(&args.base_url, Duration::from_secs(args.request_timeout))?;
    let collector = MetricsCollector::new();

    // Start periodic metrics reporter
    let reporter_task = if args.report_interval > 0 {
        let collector_clone = collector.clone();
        let interval_secs = args.report_interval;
        Some(tokio::spawn(async move {
            reporter::start_periodic_reporter(collector_clone, interval_secs).await;
        }))
    } else {
        None
    };

    // Seed for VU payload streams; the wall clock keeps unseeded runs unique
    let seed = args.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    });

    let total = plan.schedule.total_duration();
    tracing::info!(
        "Running {} profile: {} stages over {}s",
        plan.name,
        plan.schedule.stages().len(),
        total.as_secs()
    );

    let start_time = Instant::now();
    let mut ticker = interval(Duration::from_secs(1));
    let mut active: Vec<VirtualUser> = Vec::new();
    let mut retired: Vec<JoinHandle<()>> = Vec::new();
    let mut spawned = 0usize;
    let mut last_stage = usize::MAX;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                tracing::warn!("Ctrl+C received, stopping test early");
                break;
            }
        }

        let elapsed = start_time.elapsed();
        if elapsed >= total {
            break;
        }

        let stage_idx = plan.schedule.stage_index_at(elapsed);
        if stage_idx != last_stage {
            let stage = plan.schedule.stages()[stage_idx];
            tracing::info!(
                "Stage {}/{}: ramping to {} VUs over {}s",
                stage_idx + 1,
                plan.schedule.stages().len(),
                stage.target,
                stage.duration.as_secs()
            );
            last_stage = stage_idx;
        }

        let desired = plan.schedule.vus_at(elapsed);
        match desired.cmp(&active.len()) {
            Ordering::Greater => {
                for _ in active.len()..desired {
                    spawned += 1;
                    active.push(spawn_virtual_user(spawned, seed, &plan, &client, &collector));
                }
                tracing::debug!("Scaled up to {} virtual users", active.len());
            }
            Ordering::Less => {
                // Newest VUs stop first; they finish their current iteration
                for vu in active.drain(desired..) {
                    let _ = vu.stop.send(true);
                    retired.push(vu.handle);
                }
                tracing::debug!("Scaling down to {} virtual users", desired);
            }
            Ordering::Equal => {}
        }
    }

    tracing::info!(
        "Schedule complete, draining {} active virtual users...",
        active.len()
    );

    for vu in &active {
        let _ = vu.stop.send(true);
    }
    let handles: Vec<JoinHandle<()>> = retired
        .into_iter()
        .chain(active.into_iter().map(|vu| vu.handle))
        .collect();
    for (idx, handle) in handles.into_iter().enumerate() {
        if let Err(e) = handle.await {
            tracing::error!("Virtual user task {} panicked: {}", idx, e);
        }
    }

    tracing::info!("All virtual users drained");

    if let Some(task) = reporter_task {
        task.abort();
    }

    collector.update_system_metrics();
    let threshold_report = thresholds::evaluate(&plan.thresholds, &collector);
    reporter::print_final_report(&collector, &threshold_report);

    let summary = RunSummary::build(plan.name, &collector, &threshold_report);
    if let Some(path) = &args.summary_out {
        summary.write_to(path)?;
        tracing::info!("Summary written to {}", path.display());
    }

    Ok(RunOutcome {
        thresholds: threshold_report,
        summary,
    })
}

fn spawn_virtual_user(
    id: usize,
    seed: u64,
    plan: &ScenarioPlan,
    client: &TicketClient,
    collector: &MetricsCollector,
) -> VirtualUser {
    let (stop, mut stopped) = watch::channel(false);
    let client = client.clone();
    let collector = collector.clone();
    let payload = plan.payload.clone();
    let checks: CheckSet = plan.checks.clone();
    let think = plan.think;

    let handle = tokio::spawn(async move {
        // Derive a per-VU stream so payloads differ across users but remain
        // reproducible under a fixed --seed
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(id as u64));

        loop {
            if *stopped.borrow() {
                break;
            }

            let request = payload.generate(&mut rng);
            collector.request_started();
            let started = Instant::now();

            match client.create_ticket(&request).await {
                Ok(reply) => {
                    collector.request_completed(reply.status, reply.latency_ms());
                    if let Some(bytes) = reply.memory_usage {
                        collector.server_memory(bytes);
                    }
                    let results = checks.apply(&reply);
                    collector.iteration_finished(&results);
                }
                Err(e) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    tracing::debug!("VU {}: request failed: {}", id, e);
                    collector.request_failed(duration_ms);
                    collector.iteration_errored();
                }
            }

            if let Some(pause) = think.sample(&mut rng) {
                tokio::select! {
                    _ = tokio::time::sleep(pause) => {}
                    _ = stopped.changed() => {}
                }
            }
        }
    });

    VirtualUser { stop, handle }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_think_time_is_no_pause() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(ThinkTime::None.sample(&mut rng).is_none());
        assert!(ThinkTime::Fixed(0.0).sample(&mut rng).is_none());
    }

    #[test]
    fn fixed_think_time_is_exact() {
        let mut rng = StdRng::seed_from_u64(1);
        let pause = ThinkTime::Fixed(1.0).sample(&mut rng).unwrap();
        assert_eq!(pause, Duration::from_secs(1));
    }

    #[test]
    fn uniform_think_time_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let pause = ThinkTime::Uniform(1.0, 4.0).sample(&mut rng).unwrap();
            assert!(pause >= Duration::from_secs(1));
            assert!(pause < Duration::from_secs(4));
        }
    }

    #[test]
    fn degenerate_uniform_falls_back_to_min() {
        let mut rng = StdRng::seed_from_u64(1);
        let pause = ThinkTime::Uniform(2.0, 2.0).sample(&mut rng).unwrap();
        assert_eq!(pause, Duration::from_secs(2));
    }
}
