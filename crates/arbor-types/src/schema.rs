//! Field roles, type definitions, and the discovered schema.
//!
//! The root resource reports, per type, a mapping from field name to a role
//! string. The client reads that document exactly once and freezes it into a
//! [`Schema`]; everything the client does afterwards is interpretation of
//! these definitions.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Error;

/// Role of a field as declared by the root resource.
///
/// This is a closed union: every place that branches on field behavior
/// matches exhaustively, so a new role cannot be half-supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Plain value, read and written verbatim.
    Property,
    /// Server-invocable operation. Never part of the property state.
    Callable,
    /// Reference to other typed entities, resolved through the identity map.
    NestedProperty,
}

impl FieldKind {
    /// Parse a wire role string.
    pub fn from_role(role: &str) -> Option<FieldKind> {
        match role {
            "property" => Some(FieldKind::Property),
            "callable" => Some(FieldKind::Callable),
            "property-nested" => Some(FieldKind::NestedProperty),
            _ => None,
        }
    }

    /// The wire role string for this kind.
    pub fn as_role(&self) -> &'static str {
        match self {
            FieldKind::Property => "property",
            FieldKind::Callable => "callable",
            FieldKind::NestedProperty => "property-nested",
        }
    }
}

/// One type's field table. Immutable after bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    name: String,
    fields: HashMap<String, FieldKind>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, fields: HashMap<String, FieldKind>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role of a declared field, `None` for undeclared names.
    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.fields.get(field).copied()
    }

    pub fn is_callable(&self, field: &str) -> bool {
        self.kind_of(field) == Some(FieldKind::Callable)
    }

    /// Iterate over all declared fields and their roles.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.fields.iter().map(|(name, kind)| (name.as_str(), *kind))
    }
}

/// The full discovered schema: type name -> field table.
///
/// Produced exactly once by the bootstrap fetch. The optional server instance
/// tag (the `X-Server-UUID` response header) is kept alongside so a later
/// re-fetch can tell "same server, changed schema" from "different server".
#[derive(Debug, Clone)]
pub struct Schema {
    types: HashMap<String, TypeDefinition>,
    server_instance: Option<String>,
}

impl Schema {
    /// Parse a root schema document: `{type: {field: role}}`.
    ///
    /// Unrecognized role strings fail the whole parse. A half-understood
    /// schema would produce contracts that silently mishandle fields, so the
    /// error is surfaced at bootstrap instead.
    pub fn parse(doc: &Value, server_instance: Option<String>) -> Result<Schema, Error> {
        let obj = doc
            .as_object()
            .ok_or_else(|| Error::MalformedResponse("schema document is not an object".into()))?;

        let mut types = HashMap::new();
        for (type_name, field_doc) in obj {
            let field_obj = field_doc.as_object().ok_or_else(|| {
                Error::MalformedResponse(format!("field table for `{type_name}` is not an object"))
            })?;

            let mut fields = HashMap::new();
            for (field_name, role) in field_obj {
                let role_str = role.as_str().ok_or_else(|| {
                    Error::MalformedResponse(format!(
                        "role of `{type_name}.{field_name}` is not a string"
                    ))
                })?;
                let kind = FieldKind::from_role(role_str).ok_or_else(|| {
                    Error::MalformedResponse(format!(
                        "unrecognized role `{role_str}` for `{type_name}.{field_name}`"
                    ))
                })?;
                fields.insert(field_name.clone(), kind);
            }

            types.insert(
                type_name.clone(),
                TypeDefinition::new(type_name.clone(), fields),
            );
        }

        Ok(Schema {
            types,
            server_instance,
        })
    }

    /// Definition for a type, `None` if the schema never declared it.
    pub fn get(&self, type_name: &str) -> Option<&TypeDefinition> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// All declared type names, in no particular order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn server_instance(&self) -> Option<&str> {
        self.server_instance.as_deref()
    }

    /// Compare the declared types only, ignoring the server instance tag.
    pub fn same_types(&self, other: &Schema) -> bool {
        self.types == other.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_round_trip() {
        for kind in [
            FieldKind::Property,
            FieldKind::Callable,
            FieldKind::NestedProperty,
        ] {
            assert_eq!(FieldKind::from_role(kind.as_role()), Some(kind));
        }
        assert_eq!(FieldKind::from_role("nested"), None);
    }

    #[test]
    fn test_parse_schema_document() {
        let doc = json!({
            "Timing": {
                "name": "property",
                "duration": "property",
                "restart": "callable",
                "children": "property-nested"
            }
        });

        let schema = Schema::parse(&doc, Some("abc-123".into())).unwrap();
        let timing = schema.get("Timing").unwrap();

        assert_eq!(timing.kind_of("name"), Some(FieldKind::Property));
        assert_eq!(timing.kind_of("restart"), Some(FieldKind::Callable));
        assert_eq!(timing.kind_of("children"), Some(FieldKind::NestedProperty));
        assert_eq!(timing.kind_of("missing"), None);
        assert!(timing.is_callable("restart"));
        assert!(!timing.is_callable("name"));
        assert_eq!(schema.server_instance(), Some("abc-123"));
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        let doc = json!({"Widget": {"spin": "spinnable"}});
        let err = Schema::parse(&doc, None).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = Schema::parse(&json!(["Widget"]), None).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_same_types_ignores_server_instance() {
        let doc = json!({"Widget": {"label": "property"}});
        let a = Schema::parse(&doc, Some("uuid-a".into())).unwrap();
        let b = Schema::parse(&doc, Some("uuid-b".into())).unwrap();
        assert!(a.same_types(&b));

        let changed = json!({"Widget": {"label": "callable"}});
        let c = Schema::parse(&changed, Some("uuid-a".into())).unwrap();
        assert!(!a.same_types(&c));
    }
}
