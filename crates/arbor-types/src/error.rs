//! Error taxonomy for the arbor client.
//!
//! Structural errors (`UnknownType`, `InvalidOperation`, `InvalidArguments`,
//! `MalformedNestedData`) are raised synchronously before or during local
//! processing and never issue a request. Transport failures from any fetch or
//! call are folded into the single [`Error::Transport`] variant, so callers
//! handle one failure path regardless of which operation hit the network.

use thiserror::Error;

/// Errors surfaced by the arbor client.
#[derive(Debug, Error)]
pub enum Error {
    /// The initial root fetch failed or returned an undecodable schema.
    /// Fatal to startup: no client handle is produced.
    #[error("schema unavailable: {0}")]
    SchemaUnavailable(String),

    /// A type name was requested that the bootstrapped schema never declared.
    /// Checked locally; no request is issued.
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// An operation name was invoked that is not declared callable for the
    /// entity's type. Checked locally before any network activity.
    #[error("invalid operation `{method}` on type `{type_name}`")]
    InvalidOperation { type_name: String, method: String },

    /// Call arguments must be JSON null (no arguments), an array (positional),
    /// or an object (keyword). Checked locally before any network activity.
    #[error("invalid arguments for `{method}`: expected null, array, or object")]
    InvalidArguments { method: String },

    /// A nested reference payload was not the `{"targetType", "data"}`
    /// envelope, or its data was neither a scalar id, an id list, nor an id
    /// mapping. Fails only the field being resolved; siblings proceed.
    #[error("malformed nested data: {detail}")]
    MalformedNestedData { detail: String },

    /// The root resource reports a different schema than the bootstrapped one.
    /// Detected and broadcast, never reconciled: existing type contracts and
    /// entities keep operating on the old schema.
    #[error("schema changed after bootstrap: {detail}")]
    SchemaChanged { detail: String },

    /// A response body decoded as JSON but did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// HTTP-level failure, from plain fetches and calls alike.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// HTTP transport failures.
///
/// All variants flow through [`Error::Transport`]; the split exists so the
/// transport layer can report what it actually observed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success HTTP status.
    #[error("server returned status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The server's failure envelope (`{"success": false, "error": ...}`).
    #[error("server error: {0}")]
    Server(String),

    /// The response body was not valid JSON.
    #[error("invalid response body: {0}")]
    Body(String),
}
