//! Ramp profile - climb to a warm step, push to peak, ramp down

use super::runner::{ScenarioPlan, ThinkTime};
use crate::checks::{Check, CheckSet};
use crate::cli::RampArgs;
use crate::payload::PayloadSpec;
use crate::stages::schedule;
use crate::thresholds::Threshold;

const LATENCY_BOUND_MS: u64 = 2000;
const FAILURE_RATE_BOUND: f64 = 0.05;

pub fn plan(args: RampArgs) -> ScenarioPlan {
    ScenarioPlan {
        name: "ramp",
        schedule: schedule(&[
            (args.ramp_up, args.warm_target),
            (args.hold, args.peak_target),
            (args.ramp_down, 0),
        ]),
        payload: PayloadSpec::general_only("Load test"),
        checks: CheckSet::new(vec![
            Check::StatusCreated,
            Check::LatencyUnder(LATENCY_BOUND_MS),
            Check::HasReferenceCode,
        ]),
        thresholds: vec![
            Threshold::DurationP95Under {
                max_ms: LATENCY_BOUND_MS,
            },
            Threshold::RequestFailureRateUnder {
                max: FAILURE_RATE_BOUND,
            },
            Threshold::CheckFailureRateUnder {
                max: FAILURE_RATE_BOUND,
            },
        ],
        think: ThinkTime::Fixed(args.think_time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn default_args() -> RampArgs {
        RampArgs {
            warm_target: 10,
            peak_target: 50,
            ramp_up: 30,
            hold: 60,
            ramp_down: 30,
            think_time: 1.0,
        }
    }

    #[test]
    fn default_plan_matches_the_operational_profile() {
        let plan = plan(default_args());
        assert_eq!(plan.name, "ramp");
        assert_eq!(plan.schedule.total_duration(), Duration::from_secs(120));
        assert_eq!(plan.schedule.vus_at(Duration::from_secs(30)), 10);
        assert_eq!(plan.schedule.vus_at(Duration::from_secs(90)), 50);
        assert_eq!(plan.schedule.vus_at(Duration::from_secs(120)), 0);
        assert_eq!(plan.checks.checks().len(), 3);
        assert_eq!(plan.thresholds.len(), 3);
    }

    #[test]
    fn payload_is_general_only() {
        let plan = plan(default_args());
        assert_eq!(plan.payload.priority_ratio, 0.0);
        assert!(!plan.payload.timestamped);
        assert_eq!(plan.payload.label, "Load test");
    }
}
