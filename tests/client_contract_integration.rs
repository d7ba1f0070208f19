//! Client and check behaviour against canned ticket-service responses.

use std::time::Duration;

use serde_json::json;
use ticketero_load::checks::{Check, CheckSet};
use ticketero_load::client::TicketClient;
use ticketero_load::payload::{QueueType, TicketRequest};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_request() -> TicketRequest {
    TicketRequest {
        national_id: "48291037".to_string(),
        description: "Load test ticket 48291037".to_string(),
        queue_type: QueueType::General,
    }
}

#[tokio::test]
async fn created_reply_parses_reference_code_and_memory_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tickets"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({
                    "referenceCode": "9f1c2d84-1b7a-4f7e-9c1e-2a6f0d3b5e11",
                    "ticketCode": "T1001",
                    "status": "PENDING",
                    "positionInQueue": 1,
                    "estimatedWaitTime": 20
                }))
                .insert_header("X-Memory-Usage", "734003200"),
        )
        .mount(&server)
        .await;

    let client = TicketClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let reply = client.create_ticket(&sample_request()).await.unwrap();

    assert_eq!(reply.status.as_u16(), 201);
    let ticket = reply.ticket.as_ref().expect("body should parse");
    assert_eq!(
        ticket.reference_code.as_deref(),
        Some("9f1c2d84-1b7a-4f7e-9c1e-2a6f0d3b5e11")
    );
    assert_eq!(ticket.ticket_code.as_deref(), Some("T1001"));
    assert_eq!(reply.memory_usage, Some(734_003_200));

    let checks = CheckSet::new(vec![
        Check::StatusCreated,
        Check::LatencyUnder(2000),
        Check::HasReferenceCode,
        Check::MemoryUnder(1_000_000_000),
    ]);
    let outcomes = checks.apply(&reply);
    assert!(outcomes.iter().all(|(_, passed)| *passed), "{outcomes:?}");
}

#[tokio::test]
async fn shed_reply_satisfies_only_the_spike_status_check() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tickets"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({ "error": "Service is at capacity, retry later" })),
        )
        .mount(&server)
        .await;

    let client = TicketClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let reply = client.create_ticket(&sample_request()).await.unwrap();

    assert_eq!(reply.status.as_u16(), 429);
    assert!(Check::StatusCreatedOrShed.passes(&reply));
    assert!(!Check::StatusCreated.passes(&reply));
    // An error body has no reference code to offer
    assert!(!Check::HasReferenceCode.passes(&reply));
    // No memory header at all still counts as stable
    assert!(Check::MemoryUnder(1_000_000_000).passes(&reply));
}

#[tokio::test]
async fn validation_rejection_fails_the_status_check() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tickets"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "National ID must be 8-20 digits" })),
        )
        .mount(&server)
        .await;

    let client = TicketClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let reply = client.create_ticket(&sample_request()).await.unwrap();

    assert_eq!(reply.status.as_u16(), 400);
    assert!(!Check::StatusCreated.passes(&reply));
    assert!(!Check::StatusCreatedOrShed.passes(&reply));
}

#[tokio::test]
async fn measured_latency_includes_server_delay() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tickets"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "referenceCode": "abc" }))
                .set_delay(Duration::from_millis(120)),
        )
        .mount(&server)
        .await;

    let client = TicketClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let reply = client.create_ticket(&sample_request()).await.unwrap();

    assert!(reply.latency >= Duration::from_millis(120));
    assert!(!Check::LatencyUnder(100).passes(&reply));
    assert!(Check::LatencyUnder(5000).passes(&reply));
}

#[tokio::test]
async fn request_body_carries_the_wire_contract_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tickets"))
        .and(body_partial_json(json!({
            "nationalId": "48291037",
            "queueType": "GENERAL"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "referenceCode": "abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TicketClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let reply = client.create_ticket(&sample_request()).await.unwrap();
    assert_eq!(reply.status.as_u16(), 201);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Nothing listens on this port
    let client = TicketClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    let result = client.create_ticket(&sample_request()).await;
    assert!(result.is_err());
}
