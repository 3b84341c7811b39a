//! Identity-mapped entity graph for the arbor resource-tree client.
//!
//! This crate provides:
//! - [`entity`]: live entity instances and the shapes of resolved relations
//! - [`collection`]: per-type, insertion-ordered canonical collections
//! - [`graph`]: the identity map guaranteeing one live object per (type, id)
//! - [`resolver`]: expansion of raw nested references into shared entities
//!
//! The invariant the whole crate exists to uphold: for any (type, id) pair,
//! every reference anywhere in the graph resolves to the *same* object.
//! Entities referenced before they are fetched exist as stubs that are filled
//! in place once their own data arrives.

pub mod collection;
pub mod entity;
pub mod graph;
pub mod resolver;

// Re-export main types for convenience
pub use collection::Collection;
pub use entity::{Entity, EntityRef, Relation};
pub use graph::EntityGraph;
pub use resolver::resolve;
