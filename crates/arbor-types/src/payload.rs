//! Helpers for picking apart raw wire payloads.
//!
//! Raw entity payloads arrive as dynamic JSON and stay that way until a type
//! definition gives them meaning. The helpers here isolate the few structural
//! conventions of the wire protocol: the `_id` identifier field, the
//! `{"targetType", "data"}` nested-reference envelope, and the server's
//! failure envelope.

use serde_json::Value;

/// Wire name of the server-assigned identifier field.
pub const ID_FIELD: &str = "_id";

/// Extract the entity id from a raw payload.
///
/// Ids are opaque. String ids are taken verbatim; integer ids (servers that
/// key objects numerically) are carried as their decimal rendering so the
/// rest of the client only ever sees strings.
pub fn entity_id(raw: &Value) -> Option<String> {
    match raw.get(ID_FIELD)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A nested-reference envelope as it appears on the wire:
/// `{"targetType": "Timing", "data": <scalar | list | mapping>}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NestedRef<'a> {
    pub target_type: &'a str,
    pub data: &'a Value,
}

/// Read a nested-reference envelope, `None` if the value is shaped otherwise.
pub fn nested_ref(raw: &Value) -> Option<NestedRef<'_>> {
    let obj = raw.as_object()?;
    let target_type = obj.get("targetType")?.as_str()?;
    let data = obj.get("data")?;
    Some(NestedRef { target_type, data })
}

/// Detect the server's failure envelope: `{"success": false, "error": msg}`.
///
/// Returns the error message when the body is such an envelope.
pub fn error_envelope(body: &Value) -> Option<String> {
    let obj = body.as_object()?;
    if obj.get("success")?.as_bool()? {
        return None;
    }
    let msg = obj
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unspecified server error");
    Some(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_string_and_number() {
        assert_eq!(entity_id(&json!({"_id": "t0"})), Some("t0".into()));
        assert_eq!(entity_id(&json!({"_id": 42})), Some("42".into()));
        assert_eq!(entity_id(&json!({"_id": null})), None);
        assert_eq!(entity_id(&json!({"name": "x"})), None);
    }

    #[test]
    fn test_nested_ref_envelope() {
        let raw = json!({"targetType": "Timing", "data": ["t1", "t2"]});
        let r = nested_ref(&raw).unwrap();
        assert_eq!(r.target_type, "Timing");
        assert_eq!(r.data, &json!(["t1", "t2"]));

        assert!(nested_ref(&json!("t1")).is_none());
        assert!(nested_ref(&json!({"data": ["t1"]})).is_none());
    }

    #[test]
    fn test_error_envelope() {
        assert_eq!(
            error_envelope(&json!({"success": false, "error": "boom"})),
            Some("boom".into())
        );
        assert_eq!(error_envelope(&json!({"success": true})), None);
        assert_eq!(error_envelope(&json!({"_id": "t0"})), None);
        assert_eq!(
            error_envelope(&json!({"success": false})),
            Some("unspecified server error".into())
        );
    }
}
