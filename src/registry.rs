//! Type registry: the generic engine behind every typed contract.
//!
//! No types are synthesized at runtime. The registry holds the frozen
//! [`Schema`] and interprets each type's field-kind table wherever behavior
//! branches on a field: parsing payloads, serializing outbound state, and
//! gating operation calls. One engine, many descriptors.

use serde_json::{Map, Value};
use tracing::debug;

use arbor_graph::{resolve, EntityGraph, EntityRef};
use arbor_types::{entity_id, nested_ref, Error, FieldKind, Schema, TypeDefinition, ID_FIELD};

/// A parse failure scoped to one field. Sibling fields are unaffected.
#[derive(Debug)]
pub struct FieldFault {
    pub field: String,
    pub error: Error,
}

/// Result of parsing a raw entity payload.
#[derive(Debug)]
pub struct ParseOutcome {
    /// The canonical entity the payload was applied to.
    pub entity: EntityRef,
    /// Per-field failures (malformed nested data). Empty on a clean parse.
    pub faults: Vec<FieldFault>,
}

/// Frozen schema plus the generic field-kind interpreter.
pub struct TypeRegistry {
    schema: Schema,
}

impl TypeRegistry {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Definition for a type, or `UnknownType` - checked locally, before any
    /// network activity.
    pub fn definition(&self, type_name: &str) -> Result<&TypeDefinition, Error> {
        self.schema
            .get(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))
    }

    /// Fail unless `method` is declared callable on `type_name`.
    pub fn ensure_callable(&self, type_name: &str, method: &str) -> Result<(), Error> {
        let def = self.definition(type_name)?;
        if def.is_callable(method) {
            Ok(())
        } else {
            Err(Error::InvalidOperation {
                type_name: type_name.to_string(),
                method: method.to_string(),
            })
        }
    }

    /// Parse a raw entity payload into the canonical entity for its id.
    ///
    /// The payload must be an object carrying `_id`. Property fields are
    /// taken verbatim; nested fields go through the relation resolver (the
    /// raw value is retained alongside the resolved one); callable fields are
    /// dropped. A malformed nested field fails only itself - siblings still
    /// apply, and the fault is reported in the outcome.
    pub fn apply_payload(
        &self,
        graph: &EntityGraph,
        type_name: &str,
        raw: &Value,
    ) -> Result<ParseOutcome, Error> {
        let def = self.definition(type_name)?;

        let fields = raw.as_object().ok_or_else(|| {
            Error::MalformedResponse(format!("`{type_name}` payload is not an object"))
        })?;
        let id = entity_id(raw).ok_or_else(|| {
            Error::MalformedResponse(format!("`{type_name}` payload has no usable `{ID_FIELD}`"))
        })?;

        let entity = graph.collection(type_name).get_or_stub(&id);
        let faults = self.merge_fields(graph, def, &entity, fields);
        entity.mark_hydrated();

        Ok(ParseOutcome { entity, faults })
    }

    /// Apply a field map to an existing entity (the payload half of a call or
    /// save response, which carries no `_id`).
    pub fn merge_into(
        &self,
        graph: &EntityGraph,
        entity: &EntityRef,
        fields: &Map<String, Value>,
    ) -> Result<Vec<FieldFault>, Error> {
        let def = self.definition(entity.type_name())?;
        Ok(self.merge_fields(graph, def, entity, fields))
    }

    fn merge_fields(
        &self,
        graph: &EntityGraph,
        def: &TypeDefinition,
        entity: &EntityRef,
        fields: &Map<String, Value>,
    ) -> Vec<FieldFault> {
        let mut faults = Vec::new();

        for (name, value) in fields {
            if name == ID_FIELD {
                continue;
            }
            match def.kind_of(name) {
                Some(FieldKind::Property) => {
                    entity.set_property(name.clone(), value.clone());
                }
                Some(FieldKind::Callable) => {
                    // Servers may export a callable's last return value;
                    // it is never part of the property state.
                    debug!(type_name = %def.name(), field = %name, "dropping callable field");
                }
                Some(FieldKind::NestedProperty) => match self.resolve_nested(graph, value) {
                    Ok(relation) => entity.set_relation(name.clone(), relation, value.clone()),
                    Err(error) => faults.push(FieldFault {
                        field: name.clone(),
                        error,
                    }),
                },
                None => {
                    debug!(type_name = %def.name(), field = %name, "dropping undeclared field");
                }
            }
        }

        faults
    }

    fn resolve_nested(
        &self,
        graph: &EntityGraph,
        value: &Value,
    ) -> Result<arbor_graph::Relation, Error> {
        let envelope = nested_ref(value).ok_or_else(|| Error::MalformedNestedData {
            detail: format!("expected a {{\"targetType\", \"data\"}} envelope, got {value}"),
        })?;
        resolve(graph, envelope.target_type, envelope.data)
    }

    /// Serialize an entity for the server: current property-field values
    /// only. Callable fields have no state to send, and nested relations are
    /// intentionally not round-tripped on write (known limitation).
    pub fn serialize(&self, entity: &EntityRef) -> Value {
        Value::Object(entity.properties())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn registry() -> TypeRegistry {
        let doc = json!({
            "Timing": {
                "name": "property",
                "duration": "property",
                "restart": "callable",
                "children": "property-nested"
            }
        });
        TypeRegistry::new(Schema::parse(&doc, None).unwrap())
    }

    #[test]
    fn test_parse_selects_properties_and_drops_callables() {
        let reg = registry();
        let graph = EntityGraph::new();

        let outcome = reg
            .apply_payload(
                &graph,
                "Timing",
                &json!({"_id": "t0", "name": "root", "duration": 12.5, "restart": true}),
            )
            .unwrap();

        assert!(outcome.faults.is_empty());
        let entity = outcome.entity;
        assert_eq!(entity.property("name"), Some(json!("root")));
        assert_eq!(entity.property("duration"), Some(json!(12.5)));
        // Callable fields never land in the property set.
        assert_eq!(entity.property("restart"), None);
        assert!(!entity.is_stub());
    }

    #[test]
    fn test_parse_resolves_nested_to_ordered_stubs() {
        let reg = registry();
        let graph = EntityGraph::new();

        let outcome = reg
            .apply_payload(
                &graph,
                "Timing",
                &json!({
                    "_id": "t0",
                    "name": "root",
                    "children": {"targetType": "Timing", "data": ["t1", "t2"]}
                }),
            )
            .unwrap();

        let relation = outcome.entity.relation("children").unwrap();
        let arbor_graph::Relation::Many(refs) = relation else {
            panic!("expected Many");
        };
        assert_eq!(refs[0].id(), "t1");
        assert_eq!(refs[1].id(), "t2");
        assert!(refs[0].is_stub());
        assert!(refs[1].is_stub());

        // Raw payload retained for diagnostics.
        assert_eq!(
            outcome.entity.raw_relation("children"),
            Some(json!({"targetType": "Timing", "data": ["t1", "t2"]}))
        );
    }

    #[test]
    fn test_malformed_nested_field_does_not_abort_siblings() {
        let reg = registry();
        let graph = EntityGraph::new();

        let outcome = reg
            .apply_payload(
                &graph,
                "Timing",
                &json!({"_id": "t0", "name": "root", "children": "not-an-envelope"}),
            )
            .unwrap();

        assert_eq!(outcome.faults.len(), 1);
        assert_eq!(outcome.faults[0].field, "children");
        assert!(matches!(
            outcome.faults[0].error,
            Error::MalformedNestedData { .. }
        ));
        // The sibling property still parsed.
        assert_eq!(outcome.entity.property("name"), Some(json!("root")));
    }

    #[test]
    fn test_serialize_is_property_subset() {
        let reg = registry();
        let graph = EntityGraph::new();

        let raw = json!({
            "_id": "t0",
            "name": "root",
            "duration": 3,
            "children": {"targetType": "Timing", "data": []}
        });
        let outcome = reg.apply_payload(&graph, "Timing", &raw).unwrap();

        // serialize(parse(raw)) reproduces exactly the property subset.
        assert_eq!(
            reg.serialize(&outcome.entity),
            json!({"name": "root", "duration": 3})
        );
    }

    #[test]
    fn test_reparse_fills_same_object() {
        let reg = registry();
        let graph = EntityGraph::new();

        let first = reg
            .apply_payload(
                &graph,
                "Timing",
                &json!({"_id": "t0", "children": {"targetType": "Timing", "data": "t1"}}),
            )
            .unwrap();
        let arbor_graph::Relation::One(stub) = first.entity.relation("children").unwrap() else {
            panic!("expected One");
        };
        assert!(stub.is_stub());

        let second = reg
            .apply_payload(&graph, "Timing", &json!({"_id": "t1", "name": "leaf"}))
            .unwrap();
        assert!(Arc::ptr_eq(&stub, &second.entity));
        assert!(!stub.is_stub());
        assert_eq!(stub.property("name"), Some(json!("leaf")));
    }

    #[test]
    fn test_unknown_type_is_local() {
        let reg = registry();
        let graph = EntityGraph::new();
        let err = reg
            .apply_payload(&graph, "Gauge", &json!({"_id": "g0"}))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownType(name) if name == "Gauge"));
    }

    #[test]
    fn test_ensure_callable() {
        let reg = registry();
        assert!(reg.ensure_callable("Timing", "restart").is_ok());
        assert!(matches!(
            reg.ensure_callable("Timing", "name"),
            Err(Error::InvalidOperation { .. })
        ));
        assert!(matches!(
            reg.ensure_callable("Timing", "vanish"),
            Err(Error::InvalidOperation { .. })
        ));
        assert!(matches!(
            reg.ensure_callable("Gauge", "restart"),
            Err(Error::UnknownType(_))
        ));
    }
}
