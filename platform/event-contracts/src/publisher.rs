//! Typed publisher over the event bus.
//!
//! Serializes an event payload as JSON and publishes it on the subject
//! bound to the payload type, so a caller can never route a payload to
//! the wrong subject.

use std::sync::Arc;

use event_bus::{BusError, EventBus};
use thiserror::Error;
use tracing::debug;

use crate::EventData;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to serialize event payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("event bus publish failed: {0}")]
    Bus(#[from] BusError),
}

/// Publishes typed events on their registered subjects.
#[derive(Clone)]
pub struct Publisher {
    bus: Arc<dyn EventBus>,
}

impl Publisher {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    pub async fn publish<T: EventData>(&self, data: &T) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(data)?;
        let bytes = payload.len();
        self.bus.publish(T::SUBJECT.as_str(), payload).await?;
        debug!(subject = %T::SUBJECT, bytes, "event published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{Role, UserCreated};
    use event_bus::InMemoryBus;
    use futures::StreamExt;

    #[tokio::test]
    async fn publishes_on_the_type_bound_subject() {
        let bus = Arc::new(InMemoryBus::new());
        let mut stream = bus
            .subscribe("user:created", "test-group")
            .await
            .unwrap();

        let publisher = Publisher::new(bus.clone());
        let event = UserCreated {
            id: "u1".into(),
            email: "a@example.com".into(),
            username: "alice".into(),
            profile_picture: "https://cdn/alice.png".into(),
            role: Role::Customer,
            version: 1,
        };
        publisher.publish(&event).await.unwrap();

        let msg = tokio::time::timeout(std::time::Duration::from_secs(1), stream.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(msg.subject, "user:created");
        let decoded: UserCreated = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(decoded, event);
    }
}
