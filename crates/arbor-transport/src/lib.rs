//! Transport layer for the arbor resource-tree client.
//!
//! This crate provides:
//! - [`Transport`]: the backend abstraction the client speaks through
//! - [`http`]: a `ureq`-backed implementation against a live server
//! - [`fixture`]: an in-memory scripted implementation for hermetic tests
//!
//! The client never talks HTTP directly; everything goes through the trait so
//! hydration can come from the network or from fixtures without the caller
//! changing shape.
//!
//! # Example
//!
//! ```ignore
//! use arbor_transport::{HttpTransport, Transport};
//!
//! let transport = HttpTransport::new("http://localhost:8080");
//! let root = transport.get_root().await?;
//! ```

pub mod fixture;
pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use arbor_types::TransportError;

// Re-export main types for convenience
pub use fixture::{FixtureTransport, RequestRecord};
pub use http::HttpTransport;

/// A decoded response from the resource tree.
#[derive(Debug, Clone)]
pub struct Document {
    /// The JSON body.
    pub body: Value,
    /// Server instance tag from the `X-Server-UUID` header, when present.
    pub server_instance: Option<String>,
}

impl Document {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            server_instance: None,
        }
    }

    pub fn with_server_instance(mut self, instance: impl Into<String>) -> Self {
        self.server_instance = Some(instance.into());
        self
    }
}

/// Unified interface to the resource tree.
///
/// Retries, pooling, and cache headers are the implementation's business;
/// callers only see request/response pairs and [`TransportError`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the root resource (the schema document).
    async fn get_root(&self) -> Result<Document, TransportError>;

    /// Fetch the full collection for a type.
    async fn get_collection(&self, type_name: &str) -> Result<Document, TransportError>;

    /// Fetch a single entity.
    async fn get_entity(&self, type_name: &str, id: &str) -> Result<Document, TransportError>;

    /// Post a JSON body to an entity's per-instance endpoint.
    async fn post_entity(
        &self,
        type_name: &str,
        id: &str,
        body: &Value,
    ) -> Result<Document, TransportError>;
}
