//! HTTP transport against a live resource-tree server.
//!
//! Paths follow the server's routing table:
//! - `GET  {base}/root` - schema document
//! - `GET  {base}/root/{type}` - collection listing
//! - `GET  {base}/root/{type}/{id}` - single entity
//! - `POST {base}/root/{type}/{id}` - entity update / operation call

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use arbor_types::{error_envelope, TransportError};

use crate::{Document, Transport};

/// Response header carrying the server instance tag.
const SERVER_INSTANCE_HEADER: &str = "X-Server-UUID";

/// `ureq`-backed transport for the resource tree.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Default request timeout in seconds (can be overridden by env).
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    fn default_timeouts() -> (Duration, Duration) {
        let timeout_secs = std::env::var("ARBOR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_TIMEOUT_SECS);
        let connect_secs = std::env::var("ARBOR_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_CONNECT_TIMEOUT_SECS);
        (
            Duration::from_secs(timeout_secs),
            Duration::from_secs(connect_secs),
        )
    }

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    /// Create a transport for a server base URL (no trailing `/root`).
    pub fn new(base_url: &str) -> Self {
        let (timeout, connect_timeout) = Self::default_timeouts();
        Self::with_timeouts(base_url, timeout, connect_timeout)
    }

    /// Create a transport with explicit timeouts.
    pub fn with_timeouts(base_url: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: Self::build_agent(timeout, connect_timeout),
        }
    }

    fn root_url(&self) -> String {
        format!("{}/root", self.base_url)
    }

    fn collection_url(&self, type_name: &str) -> String {
        format!("{}/root/{}", self.base_url, type_name)
    }

    fn entity_url(&self, type_name: &str, id: &str) -> String {
        format!("{}/root/{}/{}", self.base_url, type_name, id)
    }

    fn get_json(&self, url: &str) -> Result<Document, TransportError> {
        debug!(url, "GET");
        let response = self.agent.get(url).call().map_err(map_ureq_error)?;
        decode_response(response)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<Document, TransportError> {
        debug!(url, "POST");
        let response = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(map_ureq_error)?;
        decode_response(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_root(&self) -> Result<Document, TransportError> {
        self.get_json(&self.root_url())
    }

    async fn get_collection(&self, type_name: &str) -> Result<Document, TransportError> {
        self.get_json(&self.collection_url(type_name))
    }

    async fn get_entity(&self, type_name: &str, id: &str) -> Result<Document, TransportError> {
        self.get_json(&self.entity_url(type_name, id))
    }

    async fn post_entity(
        &self,
        type_name: &str,
        id: &str,
        body: &Value,
    ) -> Result<Document, TransportError> {
        self.post_json(&self.entity_url(type_name, id), body)
    }
}

fn decode_response(response: ureq::Response) -> Result<Document, TransportError> {
    let server_instance = response
        .header(SERVER_INSTANCE_HEADER)
        .map(str::to_string);

    let body: Value = response
        .into_json()
        .map_err(|e| TransportError::Body(e.to_string()))?;

    // The server reports handler failures in-band with a 200 status.
    if let Some(msg) = error_envelope(&body) {
        return Err(TransportError::Server(msg));
    }

    Ok(Document {
        body,
        server_instance,
    })
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Status(status, response) => TransportError::Status {
            status,
            detail: response.status_text().to_string(),
        },
        ureq::Error::Transport(t) => TransportError::Request(t.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_layout() {
        let t = HttpTransport::with_timeouts(
            "http://localhost:8080/",
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        assert_eq!(t.root_url(), "http://localhost:8080/root");
        assert_eq!(t.collection_url("Timing"), "http://localhost:8080/root/Timing");
        assert_eq!(
            t.entity_url("Timing", "t0"),
            "http://localhost:8080/root/Timing/t0"
        );
    }
}
