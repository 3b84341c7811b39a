//! Per-type canonical collections.
//!
//! A [`Collection`] is the single home for every live entity of one type:
//! insertion-ordered, keyed by id, unique per id. Both fetch results and
//! resolver-created stubs land here, which is what makes identity work - a
//! stub created by resolving a reference and the entity later fetched under
//! that id are the same object.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::entity::{Entity, EntityRef};

#[derive(Default)]
struct CollectionInner {
    order: Vec<EntityRef>,
    by_id: HashMap<String, usize>,
}

/// Insertion-ordered set of entities of one type, keyed by unique id.
pub struct Collection {
    type_name: String,
    inner: RwLock<CollectionInner>,
}

impl Collection {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            inner: RwLock::new(CollectionInner::default()),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Look up an entity by id.
    pub fn get(&self, id: &str) -> Option<EntityRef> {
        let inner = self.inner.read();
        inner.by_id.get(id).map(|&i| inner.order[i].clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }

    /// Snapshot of all entities in insertion order.
    pub fn entries(&self) -> Vec<EntityRef> {
        self.inner.read().order.clone()
    }

    /// Return the canonical entity for `id`, creating and registering a stub
    /// if the id has not been seen yet.
    ///
    /// The check-and-insert is done under one write lock so two racing
    /// resolutions of the same id cannot both create an object.
    pub fn get_or_stub(&self, id: &str) -> EntityRef {
        let mut inner = self.inner.write();
        if let Some(&i) = inner.by_id.get(id) {
            return inner.order[i].clone();
        }

        debug!(type_name = %self.type_name, id, "creating stub");
        let stub = Entity::stub(&self.type_name, id);
        let index = inner.order.len();
        inner.order.push(stub.clone());
        inner.by_id.insert(id.to_string(), index);
        stub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_or_stub_is_canonical() {
        let c = Collection::new("Timing");
        let a = c.get_or_stub("t1");
        let b = c.get_or_stub("t1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let c = Collection::new("Timing");
        c.get_or_stub("t2");
        c.get_or_stub("t0");
        c.get_or_stub("t1");

        let ids: Vec<_> = c.entries().iter().map(|e| e.id().to_string()).collect();
        assert_eq!(ids, vec!["t2", "t0", "t1"]);
    }

    #[test]
    fn test_get_misses_unknown_ids() {
        let c = Collection::new("Timing");
        assert!(c.get("t9").is_none());
        assert!(!c.contains("t9"));
        c.get_or_stub("t9");
        assert!(c.get("t9").is_some());
    }
}
