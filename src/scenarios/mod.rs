// Scenarios module
// Traffic profiles and the shared virtual-user engine

pub mod ramp;
pub mod runner;
pub mod soak;
pub mod spike;

pub use runner::{RunOutcome, ScenarioPlan, ThinkTime};
