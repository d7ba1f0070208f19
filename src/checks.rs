//! Per-response assertions, recorded as named pass/fail rates.

use reqwest::StatusCode;

use crate::client::TicketReply;

/// A named assertion applied to every response a virtual user receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Status is 201 Created.
    StatusCreated,
    /// Status is 201 Created, or 429 when the service sheds load.
    StatusCreatedOrShed,
    /// Measured latency is strictly under the bound, in milliseconds.
    LatencyUnder(u64),
    /// The response body carried a non-empty reference code.
    HasReferenceCode,
    /// The reported memory usage is under the ceiling, in bytes. A missing
    /// header passes.
    MemoryUnder(u64),
}

impl Check {
    /// Stable name used in reports and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Check::StatusCreated => "status_is_201",
            Check::StatusCreatedOrShed => "status_is_201_or_429",
            Check::LatencyUnder(_) => "response_time_in_bound",
            Check::HasReferenceCode => "has_reference_code",
            Check::MemoryUnder(_) => "memory_stable",
        }
    }

    pub fn passes(&self, reply: &TicketReply) -> bool {
        match self {
            Check::StatusCreated => reply.status == StatusCode::CREATED,
            Check::StatusCreatedOrShed => {
                reply.status == StatusCode::CREATED
                    || reply.status == StatusCode::TOO_MANY_REQUESTS
            }
            Check::LatencyUnder(max_ms) => reply.latency_ms() < *max_ms,
            Check::HasReferenceCode => reply
                .ticket
                .as_ref()
                .and_then(|t| t.reference_code.as_deref())
                .is_some_and(|code| !code.is_empty()),
            Check::MemoryUnder(ceiling) => match reply.memory_usage {
                Some(bytes) => bytes < *ceiling,
                None => true,
            },
        }
    }
}

/// The set of checks a profile applies to each response.
#[derive(Debug, Clone)]
pub struct CheckSet(Vec<Check>);

impl CheckSet {
    pub fn new(checks: Vec<Check>) -> Self {
        Self(checks)
    }

    pub fn checks(&self) -> &[Check] {
        &self.0
    }

    /// Apply every check, returning `(name, passed)` pairs in order.
    pub fn apply(&self, reply: &TicketReply) -> Vec<(&'static str, bool)> {
        self.0
            .iter()
            .map(|check| (check.name(), check.passes(reply)))
            .collect()
    }
}
