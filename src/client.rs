//! HTTP client for the ticket-creation endpoint.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use thiserror::Error;

use crate::payload::{CreatedTicket, TicketRequest};

/// Response header carrying the service's reported memory usage in bytes.
pub const MEMORY_USAGE_HEADER: &str = "X-Memory-Usage";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL `{0}`")]
    InvalidBaseUrl(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// One observed response: status, wall latency, parsed body (when it parsed)
/// and the optional memory-usage header.
#[derive(Debug, Clone)]
pub struct TicketReply {
    pub status: StatusCode,
    pub latency: Duration,
    pub ticket: Option<CreatedTicket>,
    pub memory_usage: Option<u64>,
}

impl TicketReply {
    pub fn latency_ms(&self) -> u64 {
        self.latency.as_millis() as u64
    }
}

/// Pooled client for POST /api/tickets.
///
/// The client is cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct TicketClient {
    http: reqwest::Client,
    create_url: reqwest::Url,
}

impl TicketClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let create_url = format!("{}/api/tickets", base_url.trim_end_matches('/'));
        let create_url = reqwest::Url::parse(&create_url)
            .map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, create_url })
    }

    /// Issue one ticket-creation request and measure its wall latency.
    ///
    /// Any HTTP status is an `Ok` reply; status policy belongs to the checks
    /// layer. Transport errors and timeouts are `Err`. An unparseable body is
    /// tolerated (`ticket` stays `None`) so the reference-code check can
    /// decide what that means.
    pub async fn create_ticket(&self, request: &TicketRequest) -> Result<TicketReply, ClientError> {
        let started = Instant::now();
        let response = self
            .http
            .post(self.create_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let memory_usage = response
            .headers()
            .get(MEMORY_USAGE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());

        let body = response.bytes().await?;
        let latency = started.elapsed();
        let ticket = serde_json::from_slice(&body).ok();

        Ok(TicketReply {
            status,
            latency,
            ticket,
            memory_usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalised() {
        let client = TicketClient::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.create_url.as_str(), "http://localhost:8080/api/tickets");
    }

    #[test]
    fn bare_host_gets_the_creation_path() {
        let client = TicketClient::new("http://10.0.0.7:9090", Duration::from_secs(5)).unwrap();
        assert_eq!(client.create_url.as_str(), "http://10.0.0.7:9090/api/tickets");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = TicketClient::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl(_)));
    }
}
