//! Completion notifications.
//!
//! Server responses are folded into entity state asynchronously; the event
//! bus is how the rest of the application observes that. Subscription is
//! optional - publishing never blocks and is fine with zero subscribers.

use serde_json::Value;
use tokio::sync::broadcast;

use arbor_graph::EntityRef;

/// Buffered events per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// Notifications emitted by the client.
#[derive(Debug, Clone)]
pub enum Event {
    /// An entity's state was refreshed from a server response. Carries the
    /// updated entity and the raw response it was refreshed from.
    EntitySynced { entity: EntityRef, raw: Value },

    /// A server-side operation completed. Emitted after the corresponding
    /// [`Event::EntitySynced`], carrying the operation's return value.
    CallCompleted {
        entity: EntityRef,
        method: String,
        value: Value,
    },

    /// The root resource reported a different schema than the bootstrapped
    /// one. The client keeps operating on the old schema; nothing rebuilds.
    SchemaChanged { detail: String },
}

/// Broadcast bus for [`Event`]s.
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Open a new subscription. Each subscriber sees every event published
    /// after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Publish an event. A send with no live subscribers is not an error.
    pub fn publish(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}
