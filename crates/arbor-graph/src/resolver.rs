//! Expansion of raw nested references into live shared entities.
//!
//! The resolver turns the `data` half of a nested-reference envelope into a
//! [`Relation`] with the same shape: scalar id -> one entity, id list ->
//! ordered entities, id mapping -> same keys with entity values. Ids that the
//! graph has not seen yet become stubs, so entities may reference each other
//! before either side has been independently fetched.

use serde_json::Value;

use arbor_types::Error;

use crate::entity::{EntityRef, Relation};
use crate::graph::EntityGraph;

/// Resolve raw nested-reference data against the identity map.
///
/// `raw` must be a scalar id, an ordered sequence of ids, or a named mapping
/// of key -> id; any other shape fails with [`Error::MalformedNestedData`].
/// Every id resolves to the canonical entity for `(target_type, id)`,
/// creating a registered stub when the id is new.
pub fn resolve(graph: &EntityGraph, target_type: &str, raw: &Value) -> Result<Relation, Error> {
    let collection = graph.collection(target_type);

    match raw {
        Value::String(_) | Value::Number(_) => {
            let id = scalar_id(target_type, raw)?;
            Ok(Relation::One(collection.get_or_stub(&id)))
        }
        Value::Array(items) => {
            let mut refs: Vec<EntityRef> = Vec::with_capacity(items.len());
            for item in items {
                let id = scalar_id(target_type, item)?;
                refs.push(collection.get_or_stub(&id));
            }
            Ok(Relation::Many(refs))
        }
        Value::Object(map) => {
            let mut refs = std::collections::HashMap::with_capacity(map.len());
            for (key, item) in map {
                let id = scalar_id(target_type, item)?;
                refs.insert(key.clone(), collection.get_or_stub(&id));
            }
            Ok(Relation::Named(refs))
        }
        other => Err(Error::MalformedNestedData {
            detail: format!(
                "reference to `{target_type}` must be an id, an id list, or an id mapping, got {}",
                json_kind(other)
            ),
        }),
    }
}

/// Read one id out of a scalar position. String ids are taken verbatim;
/// numeric ids are carried as their decimal rendering.
fn scalar_id(target_type: &str, value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::MalformedNestedData {
            detail: format!(
                "id referencing `{target_type}` must be a string or number, got {}",
                json_kind(other)
            ),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
