//! The client facade: one object owning transport, schema, and graph.
//!
//! Construction *is* the readiness signal: [`Client::connect`] returns only
//! after the schema bootstrap succeeded, so no typed handle can exist before
//! the schema is ready. Everything is threaded through this one object -
//! there is no ambient global registry.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use arbor_graph::{Collection, EntityGraph, EntityRef};
use arbor_transport::Transport;
use arbor_types::{Error, Schema};

use crate::bootstrap::{self, schema_drift};
use crate::events::{Event, EventBus};
use crate::invoker;
use crate::registry::{FieldFault, ParseOutcome, TypeRegistry};

/// Runtime client for a schema-discovered resource tree.
pub struct Client {
    transport: Arc<dyn Transport>,
    registry: TypeRegistry,
    graph: EntityGraph,
    events: EventBus,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// Bootstrap against the root resource and return a ready client.
    ///
    /// The root is fetched exactly once here. Fails with
    /// [`Error::SchemaUnavailable`] if the fetch or parse does not succeed.
    pub async fn connect(transport: Arc<dyn Transport>) -> Result<Self, Error> {
        let schema = bootstrap::bootstrap(transport.as_ref()).await?;
        Ok(Self {
            transport,
            registry: TypeRegistry::new(schema),
            graph: EntityGraph::new(),
            events: EventBus::new(),
        })
    }

    /// Convenience wrapper for a concrete transport.
    pub async fn connect_with(transport: impl Transport + 'static) -> Result<Self, Error> {
        Self::connect(Arc::new(transport)).await
    }

    /// The bootstrapped schema.
    pub fn schema(&self) -> &Schema {
        self.registry.schema()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn graph(&self) -> &EntityGraph {
        &self.graph
    }

    /// Subscribe to client notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Typed handle for a declared type.
    ///
    /// Fails with [`Error::UnknownType`] for names the bootstrapped schema
    /// never declared - checked locally, before any request.
    pub fn collection(&self, type_name: &str) -> Result<CollectionHandle<'_>, Error> {
        self.registry.definition(type_name)?;
        Ok(CollectionHandle {
            client: self,
            collection: self.graph.collection(type_name),
        })
    }

    /// Invoke a declared server-side operation on an entity.
    ///
    /// See [`crate::invoker::invoke`] for the full protocol. No ordering is
    /// guaranteed against a concurrently in-flight fetch of the same entity:
    /// whichever response arrives last overwrites the property state.
    pub async fn call(
        &self,
        entity: &EntityRef,
        method: &str,
        args: Option<Value>,
    ) -> Result<Value, Error> {
        invoker::invoke(
            self.transport.as_ref(),
            &self.registry,
            &self.graph,
            &self.events,
            entity,
            method,
            args,
        )
        .await
    }

    /// Push an entity's property state to the server.
    ///
    /// Sends exactly the property-field subset (nested relations are not
    /// round-tripped on write - known limitation) and folds the response
    /// back into the entity, emitting [`Event::EntitySynced`].
    pub async fn save(&self, entity: &EntityRef) -> Result<(), Error> {
        let body = self.registry.serialize(entity);
        let doc = self
            .transport
            .post_entity(entity.type_name(), entity.id(), &body)
            .await?;

        if let Some(fields) = doc.body.as_object() {
            let faults = self.registry.merge_into(&self.graph, entity, fields)?;
            warn_faults(entity, &faults, "save");
        }
        self.events.publish(Event::EntitySynced {
            entity: entity.clone(),
            raw: doc.body,
        });
        Ok(())
    }

    /// Re-fetch the root resource and compare against the bootstrapped
    /// schema.
    ///
    /// A differing schema is detected but never reconciled: it is logged,
    /// broadcast as [`Event::SchemaChanged`], and returned as
    /// [`Error::SchemaChanged`], while the client keeps operating on the old
    /// schema. Transport failures propagate as ordinary fetch failures.
    pub async fn refresh_schema(&self) -> Result<(), Error> {
        let fresh = bootstrap::fetch_schema(self.transport.as_ref()).await?;

        match schema_drift(self.registry.schema(), &fresh) {
            None => {
                debug!("schema unchanged");
                Ok(())
            }
            Some(detail) => {
                warn!(%detail, "schema changed after bootstrap; keeping the old schema");
                self.events.publish(Event::SchemaChanged {
                    detail: detail.clone(),
                });
                Err(Error::SchemaChanged { detail })
            }
        }
    }
}

/// Typed view over one type's canonical collection.
pub struct CollectionHandle<'c> {
    client: &'c Client,
    collection: Arc<Collection>,
}

impl std::fmt::Debug for CollectionHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("type_name", &self.type_name())
            .finish_non_exhaustive()
    }
}

impl CollectionHandle<'_> {
    pub fn type_name(&self) -> &str {
        self.collection.type_name()
    }

    /// Local lookup; never issues a request.
    pub fn get(&self, id: &str) -> Option<EntityRef> {
        self.collection.get(id)
    }

    /// Snapshot of all live entities of this type, in insertion order.
    pub fn entries(&self) -> Vec<EntityRef> {
        self.collection.entries()
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// Canonical entity for an id, created as a stub if unseen.
    pub fn stub(&self, id: &str) -> EntityRef {
        self.collection.get_or_stub(id)
    }

    /// Parse one raw payload into the canonical entity for its `_id`.
    pub fn parse(&self, raw: &Value) -> Result<ParseOutcome, Error> {
        self.client
            .registry
            .apply_payload(&self.client.graph, self.type_name(), raw)
    }

    /// Fetch the full collection and fold every payload into the graph.
    ///
    /// Returns the fetched entities in server order. Per-field resolution
    /// faults are logged and skipped; a payload that is not an entity object
    /// fails the whole fetch. Last-write-wins against any concurrently
    /// in-flight response for the same ids.
    pub async fn fetch_all(&self) -> Result<Vec<EntityRef>, Error> {
        let doc = self.client.transport.get_collection(self.type_name()).await?;
        let listing = doc.body.as_array().ok_or_else(|| {
            Error::MalformedResponse(format!(
                "collection listing for `{}` is not an array",
                self.type_name()
            ))
        })?;

        let mut entities = Vec::with_capacity(listing.len());
        for raw in listing {
            let outcome = self.parse(raw)?;
            warn_faults(&outcome.entity, &outcome.faults, "fetch_all");
            entities.push(outcome.entity);
        }
        debug!(
            type_name = self.type_name(),
            count = entities.len(),
            "collection fetched"
        );
        Ok(entities)
    }

    /// Fetch one entity by id and fold it into the graph.
    ///
    /// The canonical object for the id is filled in place, so a previously
    /// resolved stub under this id becomes hydrated rather than replaced.
    pub async fn fetch_by_id(&self, id: &str) -> Result<EntityRef, Error> {
        let doc = self
            .client
            .transport
            .get_entity(self.type_name(), id)
            .await?;
        let outcome = self.parse(&doc.body)?;
        warn_faults(&outcome.entity, &outcome.faults, "fetch_by_id");

        if outcome.entity.id() != id {
            warn!(
                type_name = self.type_name(),
                requested = id,
                got = outcome.entity.id(),
                "entity endpoint answered with a different id"
            );
        }
        Ok(outcome.entity)
    }
}

fn warn_faults(entity: &EntityRef, faults: &[FieldFault], during: &str) {
    for fault in faults {
        warn!(
            type_name = entity.type_name(),
            id = entity.id(),
            field = %fault.field,
            error = %fault.error,
            "field failed to resolve during {during}"
        );
    }
}
