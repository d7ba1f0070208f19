//! Soak profile - sustained load over an extended period
//!
//! Long steady traffic against both queues, with the memory-stability check
//! reading the service's reported usage on every response.

use super::runner::{ScenarioPlan, ThinkTime};
use crate::checks::{Check, CheckSet};
use crate::cli::SoakArgs;
use crate::payload::PayloadSpec;
use crate::stages::schedule;
use crate::thresholds::Threshold;

const LATENCY_BOUND_MS: u64 = 2000;
const FAILURE_RATE_BOUND: f64 = 0.05;

pub fn plan(args: SoakArgs) -> ScenarioPlan {
    ScenarioPlan {
        name: "soak",
        schedule: schedule(&[
            (args.ramp_up, args.target),
            (args.hold, args.target),
            (args.ramp_down, 0),
        ]),
        payload: PayloadSpec {
            label: "Soak test",
            priority_ratio: args.priority_ratio,
            timestamped: true,
        },
        checks: CheckSet::new(vec![
            Check::StatusCreated,
            Check::LatencyUnder(LATENCY_BOUND_MS),
            Check::HasReferenceCode,
            Check::MemoryUnder(args.memory_ceiling),
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
        think: ThinkTime::Uniform(args.think_min, args.think_max),
    }
}
