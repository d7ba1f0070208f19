//! In-process stub of the Ticketero ticket-creation API.
//!
//! Implements the observable contract the harness drives: POST validation
//! (400), load shedding over capacity (429), 201 with a reference code, a
//! lookup by reference code, and the `X-Memory-Usage` header on every
//! response. It exists to exercise the harness locally, not to reimplement
//! the real service's queue management.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sysinfo::{ProcessesToUpdate, System};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::cli::ServeArgs;
use crate::payload::QueueType;

const MEMORY_USAGE_HEADER: HeaderName = HeaderName::from_static("x-memory-usage");

/// Ticket codes follow the service's T#### shape, starting at T1001.
const FIRST_TICKET_CODE: u32 = 1001;

#[derive(Debug, Clone, Copy)]
pub struct StubOptions {
    /// Concurrent in-flight requests before shedding with 429.
    pub capacity: usize,
    /// Simulated per-request processing time.
    pub processing_time: Duration,
}

impl Default for StubOptions {
    fn default() -> Self {
        Self {
            capacity: 64,
            processing_time: Duration::from_millis(5),
        }
    }
}

pub struct StubState {
    options: StubOptions,
    in_flight: AtomicUsize,
    memory_bytes: AtomicU64,
    next_code: AtomicU32,
    queue_depths: Mutex<HashMap<QueueType, u32>>,
    tickets: Mutex<HashMap<String, IssuedTicket>>,
}

impl StubState {
    pub fn new(options: StubOptions) -> Self {
        Self {
            options,
            in_flight: AtomicUsize::new(0),
            memory_bytes: AtomicU64::new(0),
            next_code: AtomicU32::new(FIRST_TICKET_CODE),
            queue_depths: Mutex::new(HashMap::new()),
            tickets: Mutex::new(HashMap::new()),
        }
    }

    /// Admit one request, or refuse when the service is saturated.
    fn try_admit(self: &Arc<Self>) -> Option<AdmissionGuard> {
        let previous = self.in_flight.fetch_add(1, Ordering::AcqRel);
        if previous >= self.options.capacity {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return None;
        }
        Some(AdmissionGuard(Arc::clone(self)))
    }

    fn issue(&self, national_id: String, queue_type: QueueType) -> IssuedTicket {
        let sequence = self.next_code.fetch_add(1, Ordering::Relaxed);
        let position = {
            let mut depths = self.queue_depths.lock();
            let depth = depths.entry(queue_type).or_insert(0);
            *depth += 1;
            *depth
        };

        let ticket = IssuedTicket {
            reference_code: Uuid::new_v4().to_string(),
            ticket_code: format!("T{sequence}"),
            national_id,
            queue_type,
            status: "PENDING".to_string(),
            position_in_queue: position,
            estimated_wait_time: position * queue_type.estimated_minutes(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.tickets
            .lock()
            .insert(ticket.reference_code.clone(), ticket.clone());
        ticket
    }

    fn lookup(&self, reference_code: &str) -> Option<IssuedTicket> {
        self.tickets.lock().get(reference_code).cloned()
    }

    /// Attach status and the memory header to a JSON body.
    fn respond<T: Serialize>(&self, status: StatusCode, body: Json<T>) -> Response {
        let mut response = (status, body).into_response();
        let bytes = self.memory_bytes.load(Ordering::Relaxed);
        if let Ok(value) = HeaderValue::from_str(&bytes.to_string()) {
            response.headers_mut().insert(MEMORY_USAGE_HEADER, value);
        }
        response
    }
}

struct AdmissionGuard(Arc<StubState>);

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTicket {
    pub reference_code: String,
    pub ticket_code: String,
    pub national_id: String,
    pub queue_type: QueueType,
    pub status: String,
    pub position_in_queue: u32,
    pub estimated_wait_time: u32,
    pub created_at: String,
}

// The wire body also carries a free-text `description`; the stub accepts and
// ignores it, as serde skips unknown fields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CreateTicketBody {
    national_id: Option<String>,
    queue_type: Option<String>,
}

/// Validate a creation request the way the service does.
fn validate(body: &CreateTicketBody) -> Result<(String, QueueType), String> {
    let national_id = body.national_id.as_deref().unwrap_or("").trim();
    if national_id.is_empty() {
        return Err("National ID is required".to_string());
    }
    if national_id.len() < 8
        || national_id.len() > 20
        || !national_id.chars().all(|c| c.is_ascii_digit())
    {
        return Err("National ID must be 8-20 digits".to_string());
    }

    let queue_raw = body.queue_type.as_deref().unwrap_or("").trim();
    if queue_raw.is_empty() {
        return Err("Queue type is required".to_string());
    }
    let queue_type = QueueType::parse(queue_raw).ok_or_else(|| {
        format!("Invalid queue type: {queue_raw}. Valid types are: GENERAL, VIP, PRIORITY")
    })?;

    Ok((national_id.to_string(), queue_type))
}

async fn create_ticket(
    State(state): State<Arc<StubState>>,
    Json(body): Json<CreateTicketBody>,
) -> Response {
    // Shed before validating: a saturated service refuses work first
    let Some(_admission) = state.try_admit() else {
        return state.respond(
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({ "error": "Service is at capacity, retry later" })),
        );
    };

    match validate(&body) {
        Err(message) => {
            tracing::debug!("Rejected ticket request: {}", message);
            state.respond(
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
        }
        Ok((national_id, queue_type)) => {
            tokio::time::sleep(state.options.processing_time).await;
            let ticket = state.issue(national_id, queue_type);
            tracing::debug!(
                "Issued {} ({}) in {} queue",
                ticket.ticket_code,
                ticket.reference_code,
                ticket.queue_type
            );
            state.respond(StatusCode::CREATED, Json(ticket))
        }
    }
}

async fn get_ticket(
    State(state): State<Arc<StubState>>,
    Path(reference_code): Path<String>,
) -> Response {
    match state.lookup(&reference_code) {
        Some(ticket) => state.respond(StatusCode::OK, Json(ticket)),
        None => state.respond(
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Ticket not found" })),
        ),
    }
}

pub fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api/tickets", post(create_ticket))
        .route("/api/tickets/{reference_code}", get(get_ticket))
        .with_state(state)
}

/// Sample the stub's own process memory for the `X-Memory-Usage` header.
fn spawn_memory_probe(state: Arc<StubState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                tracing::warn!("Cannot resolve current pid, memory header stays 0: {}", e);
                return;
            }
        };
        let mut system = System::new();
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            system.refresh_processes(ProcessesToUpdate::Some(&[pid]));
            if let Some(process) = system.process(pid) {
                state.memory_bytes.store(process.memory(), Ordering::Relaxed);
            }
        }
    })
}

/// Bind the stub on `addr` and serve in a background task.
///
/// Returns the bound address (useful with port 0) and the server task handle.
pub async fn bind(addr: &str, options: StubOptions) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let state = Arc::new(StubState::new(options));
    spawn_memory_probe(Arc::clone(&state));

    let app = router(state);
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Stub server error: {}", e);
        }
    });

    Ok((local_addr, handle))
}

/// Run the stub in the foreground until Ctrl+C.
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let options = StubOptions {
        capacity: args.capacity,
        processing_time: Duration::from_millis(args.processing_time_ms),
    };

    let (addr, server) = bind(&args.bind, options).await?;
    tracing::info!("Ticketero stub service listening on http://{}", addr);
    tracing::info!("  Capacity: {} in-flight requests", args.capacity);
    tracing::info!("  Processing time: {}ms", args.processing_time_ms);
    tracing::info!("Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Stub service stopped");
    server.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(national_id: &str, queue_type: &str) -> CreateTicketBody {
        CreateTicketBody {
            national_id: Some(national_id.to_string()),
            queue_type: Some(queue_type.to_string()),
        }
    }

    #[test]
    fn accepts_the_generator_id_range() {
        assert!(validate(&body("10000000", "GENERAL")).is_ok());
        assert!(validate(&body("99999999", "PRIORITY")).is_ok());
        assert!(validate(&body("12345678901234567890", "VIP")).is_ok());
    }

    #[test]
    fn rejects_bad_national_ids() {
        assert!(validate(&body("1234567", "GENERAL")).is_err());
        assert!(validate(&body("123456789012345678901", "GENERAL")).is_err());
        assert!(validate(&body("12345abc", "GENERAL")).is_err());
        assert!(validate(&CreateTicketBody::default()).is_err());
    }

    #[test]
    fn queue_type_is_case_insensitive_but_closed() {
        assert!(validate(&body("12345678", "general")).is_ok());
        assert!(validate(&body("12345678", " VIP ")).is_ok());
        let err = validate(&body("12345678", "BUSINESS")).unwrap_err();
        assert!(err.contains("Invalid queue type"));
    }

    #[test]
    fn issue_assigns_sequential_codes_and_positions() {
        let state = StubState::new(StubOptions::default());
        let first = state.issue("11111111".to_string(), QueueType::General);
        let second = state.issue("22222222".to_string(), QueueType::General);
        let priority = state.issue("33333333".to_string(), QueueType::Priority);

        assert_eq!(first.ticket_code, "T1001");
        assert_eq!(second.ticket_code, "T1002");
        assert_eq!(priority.ticket_code, "T1003");

        assert_eq!(first.position_in_queue, 1);
        assert_eq!(second.position_in_queue, 2);
        assert_eq!(priority.position_in_queue, 1);

        assert_eq!(second.estimated_wait_time, 40);
        assert_eq!(priority.estimated_wait_time, 15);

        assert_eq!(first.status, "PENDING");
        assert!(state.lookup(&first.reference_code).is_some());
        assert!(state.lookup("missing").is_none());
    }

    #[test]
    fn admission_is_bounded_by_capacity() {
        let state = Arc::new(StubState::new(StubOptions {
            capacity: 2,
            processing_time: Duration::ZERO,
        }));

        let first = state.try_admit().unwrap();
        let _second = state.try_admit().unwrap();
        assert!(state.try_admit().is_none());

        drop(first);
        assert!(state.try_admit().is_some());
    }

    #[test]
    fn issued_tickets_serialise_with_wire_field_names() {
        let state = StubState::new(StubOptions::default());
        let ticket = state.issue("12345678".to_string(), QueueType::General);
        let json = serde_json::to_value(&ticket).unwrap();
        assert!(json["referenceCode"].is_string());
        assert_eq!(json["ticketCode"], "T1001");
        assert_eq!(json["queueType"], "GENERAL");
        assert_eq!(json["status"], "PENDING");
    }
}
