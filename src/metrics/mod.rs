//! Metrics collection, live reporting and summary export.

pub mod collector;
pub mod reporter;
pub mod summary;
pub mod types;

pub use collector::{LatencyStats, MetricsCollector};
pub use summary::RunSummary;
pub use types::TestMetrics;
