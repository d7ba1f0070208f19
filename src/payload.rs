//! Ticket payload generation and wire types for the ticket-creation endpoint.

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Queue types accepted by the ticket service.
///
/// The traffic generators only ever emit `General` and `Priority`; `Vip` is
/// part of the service's accepted set and the stub honours it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueType {
    General,
    Priority,
    Vip,
}

impl QueueType {
    /// Stable wire name, as it appears in request bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueType::General => "GENERAL",
            QueueType::Priority => "PRIORITY",
            QueueType::Vip => "VIP",
        }
    }

    /// Parse the service's accepted spellings (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GENERAL" => Some(QueueType::General),
            "PRIORITY" => Some(QueueType::Priority),
            "VIP" => Some(QueueType::Vip),
            _ => None,
        }
    }

    /// Default estimated handling time per position, in minutes.
    pub fn estimated_minutes(&self) -> u32 {
        match self {
            QueueType::General => 20,
            QueueType::Priority => 15,
            QueueType::Vip => 10,
        }
    }
}

impl std::fmt::Display for QueueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for POST /api/tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    pub national_id: String,
    pub description: String,
    pub queue_type: QueueType,
}

/// The fields of a successful creation response the harness cares about.
///
/// Everything is optional: only `reference_code` is ever asserted on, and the
/// checks layer decides what a missing field means.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatedTicket {
    pub reference_code: Option<String>,
    pub ticket_code: Option<String>,
    pub position_in_queue: Option<u32>,
    pub estimated_wait_time: Option<u32>,
}

/// Per-profile payload recipe.
#[derive(Debug, Clone)]
pub struct PayloadSpec {
    /// Description prefix, e.g. "Load test".
    pub label: &'static str,
    /// Probability of emitting a PRIORITY ticket instead of GENERAL.
    pub priority_ratio: f64,
    /// Append an RFC 3339 timestamp to the description.
    pub timestamped: bool,
}

impl PayloadSpec {
    pub fn general_only(label: &'static str) -> Self {
        Self {
            label,
            priority_ratio: 0.0,
            timestamped: false,
        }
    }

    /// Generate one ticket request.
    ///
    /// National ids are uniform 8-digit numeric strings, which always satisfy
    /// the service's 8-to-20-digit validation rule.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> TicketRequest {
        let national_id = rng.gen_range(10_000_000u64..=99_999_999u64).to_string();

        let queue_type = if self.priority_ratio > 0.0 && rng.gen::<f64>() < self.priority_ratio {
            QueueType::Priority
        } else {
            QueueType::General
        };

        let description = if self.timestamped {
            format!(
                "{} ticket {} - {}",
                self.label,
                national_id,
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
            )
        } else {
            format!("{} ticket {}", self.label, national_id)
        };

        TicketRequest {
            national_id,
            description,
            queue_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn national_ids_are_eight_digits() {
        let spec = PayloadSpec::general_only("Load test");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let request = spec.generate(&mut rng);
            assert_eq!(request.national_id.len(), 8);
            assert!(request.national_id.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(request.national_id.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn general_only_never_emits_priority() {
        let spec = PayloadSpec::general_only("Load test");
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            assert_eq!(spec.generate(&mut rng).queue_type, QueueType::General);
        }
    }

    #[test]
    fn priority_ratio_mixes_queues() {
        let spec = PayloadSpec {
            label: "Soak test",
            priority_ratio: 0.5,
            timestamped: true,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let priority = (0..1000)
            .filter(|_| spec.generate(&mut rng).queue_type == QueueType::Priority)
            .count();
        assert!((300..700).contains(&priority), "priority count {priority}");
    }

    #[test]
    fn seeded_streams_are_reproducible() {
        let spec = PayloadSpec::general_only("Load test");
        let a: Vec<String> = {
            let mut rng = StdRng::seed_from_u64(3);
            (0..20).map(|_| spec.generate(&mut rng).national_id).collect()
        };
        let b: Vec<String> = {
            let mut rng = StdRng::seed_from_u64(3);
            (0..20).map(|_| spec.generate(&mut rng).national_id).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn request_serialises_with_wire_field_names() {
        let request = TicketRequest {
            national_id: "12345678".to_string(),
            description: "Load test ticket 12345678".to_string(),
            queue_type: QueueType::General,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["nationalId"], "12345678");
        assert_eq!(json["queueType"], "GENERAL");
        assert!(json["description"].is_string());
    }

    #[test]
    fn created_ticket_tolerates_unknown_and_missing_fields() {
        let ticket: CreatedTicket = serde_json::from_str(
            r#"{"referenceCode":"abc","status":"PENDING","nationalId":"12345678"}"#,
        )
        .unwrap();
        assert_eq!(ticket.reference_code.as_deref(), Some("abc"));
        assert!(ticket.ticket_code.is_none());
    }
}
