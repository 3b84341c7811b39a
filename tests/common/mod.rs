//! Shared fixtures for integration tests.

use std::sync::Arc;
use std::sync::Once;

use serde_json::{json, Value};

use arbor::{Client, FixtureTransport};

/// Schema document used across most scenarios.
pub fn timing_schema() -> Value {
    json!({
        "Timing": {
            "name": "property",
            "duration": "property",
            "restart": "callable",
            "children": "property-nested"
        }
    })
}

/// A fixture pre-seeded with the timing schema.
pub fn timing_fixture() -> Arc<FixtureTransport> {
    Arc::new(FixtureTransport::new(timing_schema()))
}

pub async fn connect(fixture: Arc<FixtureTransport>) -> Client {
    init_tracing();
    Client::connect(fixture).await.expect("bootstrap failed")
}

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
