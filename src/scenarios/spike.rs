//! Spike profile - sudden burst of high load
//!
//! No think time: virtual users hammer the endpoint back to back, and load
//! shedding (429) counts as an acceptable response.

use super::runner::{ScenarioPlan, ThinkTime};
use crate::checks::{Check, CheckSet};
use crate::cli::SpikeArgs;
use crate::payload::PayloadSpec;
use crate::stages::schedule;
use crate::thresholds::Threshold;

const LATENCY_BOUND_MS: u64 = 3000;
const FAILURE_RATE_BOUND: f64 = 0.10;

pub fn plan(args: SpikeArgs) -> ScenarioPlan {
    ScenarioPlan {
        name: "spike",
        schedule: schedule(&[
            (args.ramp_up, args.target),
            (args.hold, args.target),
            (args.ramp_down, 0),
        ]),
        payload: PayloadSpec::general_only("Spike test"),
        checks: CheckSet::new(vec![
            Check::StatusCreatedOrShed,
            Check::LatencyUnder(LATENCY_BOUND_MS),
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
        think: ThinkTime::None,
    }
}
