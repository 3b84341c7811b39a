//! The remote-call protocol.
//!
//! A call is a POST of the single-key body `{method: args}` to the entity's
//! per-instance endpoint. The response carries the operation's return value
//! under the method name plus any property fields the operation mutated;
//! the return value is extracted and the rest is folded back into the entity
//! before any notification fires.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use arbor_graph::{EntityGraph, EntityRef};
use arbor_transport::Transport;
use arbor_types::Error;

use crate::events::{Event, EventBus};
use crate::registry::TypeRegistry;

/// Invoke a declared server-side operation on an entity.
///
/// Local preconditions are checked synchronously before any network
/// activity: the method must be declared callable for the entity's type
/// (`InvalidOperation`), and the arguments must be null (none), an array
/// (positional), or an object (keyword) - the shapes the callable protocol
/// accepts (`InvalidArguments`). Absent args are sent as an explicit `null`,
/// never omitted.
///
/// On success the response is folded into the entity and two events fire in
/// order: [`Event::EntitySynced`] with the updated entity and raw response,
/// then [`Event::CallCompleted`] with the extracted return value, which is
/// also returned. Transport failures surface exactly like fetch failures.
pub async fn invoke(
    transport: &dyn Transport,
    registry: &TypeRegistry,
    graph: &EntityGraph,
    events: &EventBus,
    entity: &EntityRef,
    method: &str,
    args: Option<Value>,
) -> Result<Value, Error> {
    registry.ensure_callable(entity.type_name(), method)?;

    let args = args.unwrap_or(Value::Null);
    if !matches!(args, Value::Null | Value::Array(_) | Value::Object(_)) {
        return Err(Error::InvalidArguments {
            method: method.to_string(),
        });
    }

    let mut body = Map::new();
    body.insert(method.to_string(), args);
    debug!(
        type_name = entity.type_name(),
        id = entity.id(),
        method,
        "invoking operation"
    );

    let doc = transport
        .post_entity(entity.type_name(), entity.id(), &Value::Object(body))
        .await?;

    let mut response = doc
        .body
        .as_object()
        .cloned()
        .ok_or_else(|| Error::MalformedResponse("call response is not an object".into()))?;
    let value = response.remove(method).unwrap_or(Value::Null);

    // Remaining fields are the operation's side effects on the entity.
    let faults = registry.merge_into(graph, entity, &response)?;
    for fault in &faults {
        warn!(
            type_name = entity.type_name(),
            id = entity.id(),
            field = %fault.field,
            error = %fault.error,
            "call response field failed to resolve"
        );
    }

    events.publish(Event::EntitySynced {
        entity: entity.clone(),
        raw: doc.body.clone(),
    });
    events.publish(Event::CallCompleted {
        entity: entity.clone(),
        method: method.to_string(),
        value: value.clone(),
    });

    Ok(value)
}
