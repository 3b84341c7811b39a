//! arbor - runtime client for schema-discovered REST resource trees.
//!
//! A single root resource publishes, per type, a mapping from field name to
//! field role (plain property, server-invocable operation, or nested
//! reference). This crate discovers that schema once, builds typed contracts
//! for each discovered type, and maintains an identity-mapped object graph in
//! which references between entities are shared rather than duplicated.
//!
//! - **Bootstrap**: [`Client::connect`] fetches the root resource exactly
//!   once; no handle exists before the schema is ready.
//! - **Collections**: [`Client::collection`] returns a typed handle, failing
//!   with [`Error::UnknownType`] for undeclared types before any request.
//! - **Identity**: all references to the same (type, id) resolve to the same
//!   live object; unseen ids become stubs filled in place later.
//! - **Calls**: [`Client::call`] invokes declared server-side operations and
//!   folds the response back into the entity, emitting [`Event`]s.
//!
//! # Example
//!
//! ```ignore
//! use arbor::{Client, HttpTransport};
//!
//! let client = Client::connect(HttpTransport::new("http://localhost:8080")).await?;
//! let timings = client.collection("Timing")?;
//! let entities = timings.fetch_all().await?;
//! client.call(&entities[0], "restart", None).await?;
//! ```

pub mod bootstrap;
pub mod client;
pub mod events;
pub mod invoker;
pub mod registry;

// Re-export main types for convenience
pub use client::{Client, CollectionHandle};
pub use events::{Event, EventBus};
pub use registry::{FieldFault, ParseOutcome, TypeRegistry};

pub use arbor_graph::{Collection, Entity, EntityGraph, EntityRef, Relation};
pub use arbor_transport::{Document, FixtureTransport, HttpTransport, RequestRecord, Transport};
pub use arbor_types::{Error, FieldKind, Schema, TransportError, TypeDefinition};
