//! The identity map: type name -> canonical collection.
//!
//! One [`EntityGraph`] exists per client. It is the single source of truth
//! for "does an entity with this id already exist", which is what guarantees
//! at most one live object per (type, id) across the whole graph.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::collection::Collection;

/// Process-wide registry of canonical collections, one per type.
///
/// Collections are created lazily on first reference and live for the
/// lifetime of the graph; nothing ever rebuilds or replaces one.
#[derive(Default)]
pub struct EntityGraph {
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical collection for a type, created on first use.
    /// Idempotent: every call for the same name returns the same object.
    pub fn collection(&self, type_name: &str) -> Arc<Collection> {
        if let Some(existing) = self.collections.read().get(type_name) {
            return existing.clone();
        }

        let mut collections = self.collections.write();
        collections
            .entry(type_name.to_string())
            .or_insert_with(|| Arc::new(Collection::new(type_name)))
            .clone()
    }

    /// The collection for a type, without creating one.
    pub fn get(&self, type_name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(type_name).cloned()
    }

    /// Number of collections referenced so far.
    pub fn collection_count(&self) -> usize {
        self.collections.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_is_idempotent() {
        let graph = EntityGraph::new();
        let a = graph.collection("Timing");
        let b = graph.collection("Timing");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(graph.collection_count(), 1);
    }

    #[test]
    fn test_lazy_creation() {
        let graph = EntityGraph::new();
        assert!(graph.get("Timing").is_none());
        graph.collection("Timing");
        assert!(graph.get("Timing").is_some());
    }

    #[test]
    fn test_identity_across_collections() {
        let graph = EntityGraph::new();
        let from_a = graph.collection("Timing").get_or_stub("t1");
        let from_b = graph.collection("Timing").get_or_stub("t1");
        assert!(Arc::ptr_eq(&from_a, &from_b));

        let other_type = graph.collection("Widget").get_or_stub("t1");
        assert!(!Arc::ptr_eq(&from_a, &other_type));
    }
}
