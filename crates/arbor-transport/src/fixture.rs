//! In-memory scripted transport for hermetic tests.
//!
//! [`FixtureTransport`] implements [`Transport`] over hand-seeded documents
//! and records every request it serves, so tests can assert both what the
//! client computed and what it put on the wire (including that nothing was
//! put on the wire at all).

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use arbor_types::TransportError;

use crate::{Document, Transport};

/// One request served by the fixture, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestRecord {
    Root,
    Collection(String),
    Entity(String, String),
    Post {
        type_name: String,
        id: String,
        body: Value,
    },
}

/// Scripted in-memory `Transport`.
#[derive(Default)]
pub struct FixtureTransport {
    root: RwLock<Option<Value>>,
    collections: RwLock<HashMap<String, Value>>,
    entities: RwLock<HashMap<(String, String), Value>>,
    post_responses: RwLock<HashMap<(String, String), VecDeque<Value>>>,
    server_instance: RwLock<Option<String>>,
    requests: Mutex<Vec<RequestRecord>>,
}

impl FixtureTransport {
    /// Create a fixture serving the given root schema document.
    pub fn new(root: Value) -> Self {
        let fixture = Self::default();
        *fixture.root.write() = Some(root);
        fixture
    }

    /// Replace the root schema document (for schema-change scenarios).
    pub fn set_root(&self, root: Value) {
        *self.root.write() = Some(root);
    }

    /// Drop the root document so further root fetches fail (a vanished
    /// server).
    pub fn clear_root(&self) {
        *self.root.write() = None;
    }

    /// Tag responses with a server instance id.
    pub fn set_server_instance(&self, instance: impl Into<String>) {
        *self.server_instance.write() = Some(instance.into());
    }

    /// Seed a collection listing (a JSON array of raw entity payloads).
    pub fn insert_collection(&self, type_name: impl Into<String>, listing: Value) {
        self.collections.write().insert(type_name.into(), listing);
    }

    /// Seed a single-entity payload.
    pub fn insert_entity(&self, type_name: impl Into<String>, id: impl Into<String>, raw: Value) {
        self.entities
            .write()
            .insert((type_name.into(), id.into()), raw);
    }

    /// Queue a response for the next POST to an entity endpoint.
    ///
    /// Responses are consumed in FIFO order, one per POST.
    pub fn queue_post_response(
        &self,
        type_name: impl Into<String>,
        id: impl Into<String>,
        response: Value,
    ) {
        self.post_responses
            .write()
            .entry((type_name.into(), id.into()))
            .or_default()
            .push_back(response);
    }

    /// Every request served so far, in order.
    pub fn requests(&self) -> Vec<RequestRecord> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn record(&self, record: RequestRecord) {
        self.requests.lock().push(record);
    }

    fn document(&self, body: Value) -> Document {
        Document {
            body,
            server_instance: self.server_instance.read().clone(),
        }
    }

    fn not_found(what: String) -> TransportError {
        TransportError::Status {
            status: 404,
            detail: what,
        }
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn get_root(&self) -> Result<Document, TransportError> {
        self.record(RequestRecord::Root);
        let root = self.root.read().clone();
        root.map(|body| self.document(body))
            .ok_or_else(|| Self::not_found("no root document seeded".into()))
    }

    async fn get_collection(&self, type_name: &str) -> Result<Document, TransportError> {
        self.record(RequestRecord::Collection(type_name.to_string()));
        let listing = self.collections.read().get(type_name).cloned();
        listing
            .map(|body| self.document(body))
            .ok_or_else(|| Self::not_found(format!("no collection seeded for `{type_name}`")))
    }

    async fn get_entity(&self, type_name: &str, id: &str) -> Result<Document, TransportError> {
        self.record(RequestRecord::Entity(type_name.to_string(), id.to_string()));
        let raw = self
            .entities
            .read()
            .get(&(type_name.to_string(), id.to_string()))
            .cloned();
        raw.map(|body| self.document(body))
            .ok_or_else(|| Self::not_found(format!("no entity seeded for `{type_name}/{id}`")))
    }

    async fn post_entity(
        &self,
        type_name: &str,
        id: &str,
        body: &Value,
    ) -> Result<Document, TransportError> {
        self.record(RequestRecord::Post {
            type_name: type_name.to_string(),
            id: id.to_string(),
            body: body.clone(),
        });
        let response = self
            .post_responses
            .write()
            .get_mut(&(type_name.to_string(), id.to_string()))
            .and_then(VecDeque::pop_front);
        response
            .map(|body| self.document(body))
            .ok_or_else(|| Self::not_found(format!("no POST response queued for `{type_name}/{id}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(fut)
    }

    #[test]
    fn test_fixture_serves_and_records() {
        let fixture = FixtureTransport::new(json!({"Timing": {"name": "property"}}));
        fixture.insert_collection("Timing", json!([{"_id": "t0", "name": "root"}]));

        block_on(async {
            let root = fixture.get_root().await.unwrap();
            assert_eq!(root.body["Timing"]["name"], "property");

            let listing = fixture.get_collection("Timing").await.unwrap();
            assert_eq!(listing.body.as_array().unwrap().len(), 1);

            assert!(fixture.get_collection("Widget").await.is_err());
        });

        assert_eq!(
            fixture.requests(),
            vec![
                RequestRecord::Root,
                RequestRecord::Collection("Timing".into()),
                RequestRecord::Collection("Widget".into()),
            ]
        );
    }

    #[test]
    fn test_post_responses_consumed_in_order() {
        let fixture = FixtureTransport::new(json!({}));
        fixture.queue_post_response("Timing", "t0", json!({"restart": true}));
        fixture.queue_post_response("Timing", "t0", json!({"restart": false}));

        block_on(async {
            let first = fixture
                .post_entity("Timing", "t0", &json!({"restart": null}))
                .await
                .unwrap();
            assert_eq!(first.body["restart"], true);

            let second = fixture
                .post_entity("Timing", "t0", &json!({"restart": null}))
                .await
                .unwrap();
            assert_eq!(second.body["restart"], false);

            assert!(fixture
                .post_entity("Timing", "t0", &json!({"restart": null}))
                .await
                .is_err());
        });
    }
}
