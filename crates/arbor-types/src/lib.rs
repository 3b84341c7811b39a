//! Shared types for the arbor workspace.
//!
//! This crate provides the canonical vocabulary used across all arbor crates:
//! - [`schema`]: field roles, type definitions, and the discovered schema
//! - [`payload`]: helpers for picking apart raw wire payloads
//! - [`error`]: the public error taxonomy
//!
//! ## Design Principles
//!
//! 1. **String ids**: entity ids are server-assigned and opaque. They are kept
//!    as `String` and never interpreted.
//!
//! 2. **Dynamic payloads**: the schema is not known at compile time, so raw
//!    entity data stays as `serde_json::Value` until a type definition gives
//!    it meaning.

pub mod error;
pub mod payload;
pub mod schema;

// Re-export main types for convenience
pub use error::{Error, TransportError};
pub use payload::{entity_id, error_envelope, nested_ref, NestedRef, ID_FIELD};
pub use schema::{FieldKind, Schema, TypeDefinition};
