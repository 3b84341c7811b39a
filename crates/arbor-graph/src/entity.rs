//! Live entity instances.
//!
//! An [`Entity`] is identified by `(type_name, id)` and shared as an
//! [`EntityRef`] (`Arc`). All mutation goes through interior locking, so a
//! late fetch or call response can update an entity that other parts of the
//! graph already hold references to. Entities are never destroyed; they live
//! as long as any collaborator retains their collection.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

/// Shared handle to a live entity. Object identity is pointer identity:
/// two references to the same (type, id) are `Arc::ptr_eq`.
pub type EntityRef = Arc<Entity>;

/// A resolved nested-reference value. Mirrors the raw data's shape exactly.
#[derive(Clone)]
pub enum Relation {
    /// Scalar id -> single entity.
    One(EntityRef),
    /// Ordered id list -> ordered entities.
    Many(Vec<EntityRef>),
    /// Named id mapping -> same keys, entity values.
    Named(HashMap<String, EntityRef>),
}

impl Relation {
    /// Number of referenced entities.
    pub fn len(&self) -> usize {
        match self {
            Relation::One(_) => 1,
            Relation::Many(refs) => refs.len(),
            Relation::Named(refs) => refs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Manual Debug: relations can form cycles (mutual references are legal), so
// targets are printed as (type, id) pairs, never recursed into.
impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = |e: &EntityRef| format!("{}:{}", e.type_name(), e.id());
        match self {
            Relation::One(e) => write!(f, "One({})", tag(e)),
            Relation::Many(refs) => {
                let tags: Vec<_> = refs.iter().map(tag).collect();
                write!(f, "Many({tags:?})")
            }
            Relation::Named(refs) => {
                let mut tags: Vec<_> = refs.iter().map(|(k, e)| (k.clone(), tag(e))).collect();
                tags.sort();
                write!(f, "Named({tags:?})")
            }
        }
    }
}

#[derive(Default)]
struct EntityState {
    properties: Map<String, Value>,
    relations: HashMap<String, Relation>,
    /// Original raw nested payloads, retained for diagnostics.
    raw_relations: HashMap<String, Value>,
    /// True until the entity's own data has been applied at least once.
    stub: bool,
}

/// A live entity in the graph.
pub struct Entity {
    type_name: String,
    id: String,
    state: RwLock<EntityState>,
}

impl Entity {
    /// Create a hydration-pending stub: only the id is populated.
    pub fn stub(type_name: impl Into<String>, id: impl Into<String>) -> EntityRef {
        Arc::new(Entity {
            type_name: type_name.into(),
            id: id.into(),
            state: RwLock::new(EntityState {
                stub: true,
                ..EntityState::default()
            }),
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True while no payload of the entity's own has been applied yet.
    pub fn is_stub(&self) -> bool {
        self.state.read().stub
    }

    /// Mark the entity as hydrated (its own data has arrived).
    pub fn mark_hydrated(&self) {
        self.state.write().stub = false;
    }

    /// Current value of a property field.
    pub fn property(&self, name: &str) -> Option<Value> {
        self.state.read().properties.get(name).cloned()
    }

    pub fn set_property(&self, name: impl Into<String>, value: Value) {
        self.state.write().properties.insert(name.into(), value);
    }

    /// Snapshot of all property fields. This is exactly the outbound
    /// serialization: callable and nested fields are never in here.
    pub fn properties(&self) -> Map<String, Value> {
        self.state.read().properties.clone()
    }

    /// Resolved value of a nested field.
    pub fn relation(&self, name: &str) -> Option<Relation> {
        self.state.read().relations.get(name).cloned()
    }

    /// The raw payload a nested field was resolved from.
    pub fn raw_relation(&self, name: &str) -> Option<Value> {
        self.state.read().raw_relations.get(name).cloned()
    }

    pub fn set_relation(&self, name: impl Into<String>, relation: Relation, raw: Value) {
        let name = name.into();
        let mut state = self.state.write();
        state.relations.insert(name.clone(), relation);
        state.raw_relations.insert(name, raw);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Entity")
            .field("type_name", &self.type_name)
            .field("id", &self.id)
            .field("stub", &state.stub)
            .field("properties", &state.properties)
            .field("relations", &state.relations)
            .finish()
    }
}
