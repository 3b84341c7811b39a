//! Schema bootstrap: the one-shot root fetch.
//!
//! The root resource is fetched exactly once per client, at construction.
//! Everything after that interprets the frozen [`Schema`]; a later re-fetch
//! can only *detect* drift (see [`schema_drift`] and
//! [`crate::client::Client::refresh_schema`]), never reconcile it.

use tracing::{debug, info};

use arbor_transport::Transport;
use arbor_types::{Error, Schema};

/// Fetch and parse the root schema document.
///
/// Transport and decode failures are returned as-is; use [`bootstrap`] for
/// the startup path where every failure means `SchemaUnavailable`.
pub async fn fetch_schema(transport: &dyn Transport) -> Result<Schema, Error> {
    debug!("fetching root resource");
    let doc = transport.get_root().await?;
    let schema = Schema::parse(&doc.body, doc.server_instance)?;
    debug!(types = schema.type_names().count(), "parsed schema document");
    Ok(schema)
}

/// Bootstrap the schema at startup.
///
/// Any failure - transport or parse - is fatal to startup and surfaces as
/// [`Error::SchemaUnavailable`].
pub async fn bootstrap(transport: &dyn Transport) -> Result<Schema, Error> {
    let schema = fetch_schema(transport)
        .await
        .map_err(|e| Error::SchemaUnavailable(e.to_string()))?;
    info!(
        types = schema.type_names().count(),
        server_instance = schema.server_instance().unwrap_or("-"),
        "schema ready"
    );
    Ok(schema)
}

/// Describe how a re-fetched schema differs from the bootstrapped one.
///
/// Returns `None` when the declared types are identical (a changed server
/// instance tag alone is not drift - a restarted server serving the same
/// schema is still the same contract).
pub fn schema_drift(old: &Schema, new: &Schema) -> Option<String> {
    if old.same_types(new) {
        return None;
    }

    let mut added: Vec<&str> = new.type_names().filter(|t| !old.contains(t)).collect();
    let mut removed: Vec<&str> = old.type_names().filter(|t| !new.contains(t)).collect();
    let mut changed: Vec<&str> = old
        .type_names()
        .filter(|t| new.contains(t) && new.get(t) != old.get(t))
        .collect();
    added.sort_unstable();
    removed.sort_unstable();
    changed.sort_unstable();

    let mut parts = Vec::new();
    if !added.is_empty() {
        parts.push(format!("added types {added:?}"));
    }
    if !removed.is_empty() {
        parts.push(format!("removed types {removed:?}"));
    }
    if !changed.is_empty() {
        parts.push(format!("changed field roles on {changed:?}"));
    }
    match (old.server_instance(), new.server_instance()) {
        (Some(a), Some(b)) if a != b => {
            parts.push(format!("server instance changed {a} -> {b}"));
        }
        _ => {}
    }

    Some(parts.join("; "))
}
