//! # EventBus Abstraction
//!
//! A platform-level abstraction for event-driven messaging across modules.
//!
//! ## Why This Lives in `platform/`
//!
//! The EventBus is a **shared runtime capability** that all modules depend on.
//! Placing it in `platform/` allows:
//! - Modules to depend on platform crates without circular dependencies
//! - Plug-and-play module development (modules don't depend on each other)
//! - Config-driven swap between NATS (production) and InMemory (dev/test)
//!
//! ## Delivery Model
//!
//! Every subscription names a **queue group**: the bus delivers each message to
//! exactly one member of the group, so a module can scale horizontally without
//! processing an event twice. Delivery is at-least-once — a message that is not
//! acknowledged within the ack deadline is redelivered, and consumers must be
//! idempotent against duplicates.
//!
//! ## Implementations
//!
//! - **NatsBus**: Production implementation using NATS JetStream durable consumers
//! - **InMemoryBus**: Test/dev implementation using in-memory channels, with the
//!   same queue-group and redelivery semantics
//!
//! ## Usage
//!
//! ```rust,no_run
//! use event_bus::{EventBus, NatsBus, InMemoryBus};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Production: NATS
//! let nats_client = async_nats::connect("nats://localhost:4222").await?;
//! let bus: Arc<dyn EventBus> = Arc::new(NatsBus::new(nats_client));
//!
//! // Dev/Test: In-Memory
//! let bus: Arc<dyn EventBus> = Arc::new(InMemoryBus::new());
//!
//! // Publish an event
//! bus.publish("user:created", b"{\"id\":\"u1\"}".to_vec()).await?;
//!
//! // Subscribe under a queue group, ack after processing
//! let mut stream = bus.subscribe("user:created", "commerce-service").await?;
//! while let Some(msg) = futures::StreamExt::next(&mut stream).await {
//!     println!("Received {} bytes on {}", msg.payload.len(), msg.subject);
//!     msg.ack().await?;
//! }
//! # Ok(())
//! # }
//! ```

mod inmemory_bus;
mod nats_bus;

pub use inmemory_bus::InMemoryBus;
pub use nats_bus::NatsBus;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;
use std::sync::Arc;

/// A message received from the event bus.
///
/// Carries an acknowledgement handle: call [`BusMessage::ack`] once processing
/// has succeeded. A message that is never acked is redelivered by the bus after
/// its ack deadline expires.
#[derive(Clone)]
pub struct BusMessage {
    /// The subject this message was published to
    pub subject: String,
    /// The message payload (raw bytes)
    pub payload: Vec<u8>,
    acker: Arc<dyn MessageAck>,
}

impl BusMessage {
    /// Create a message with a no-op acknowledgement handle.
    ///
    /// Useful in tests that construct messages directly rather than receiving
    /// them from a bus.
    pub fn new(subject: String, payload: Vec<u8>) -> Self {
        Self {
            subject,
            payload,
            acker: Arc::new(NoopAck),
        }
    }

    /// Attach an acknowledgement handle (used by bus implementations).
    pub fn with_acker(mut self, acker: Arc<dyn MessageAck>) -> Self {
        self.acker = acker;
        self
    }

    /// Acknowledge the message, removing it from the bus's redelivery tracking.
    ///
    /// Call this only after processing succeeded; an unacked message comes back.
    pub async fn ack(&self) -> BusResult<()> {
        self.acker.ack().await
    }
}

impl fmt::Debug for BusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusMessage")
            .field("subject", &self.subject)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Acknowledgement handle for a delivered message.
#[async_trait]
pub trait MessageAck: Send + Sync {
    /// Mark the delivery as processed. Acking twice is not an error.
    async fn ack(&self) -> BusResult<()>;
}

struct NoopAck;

#[async_trait]
impl MessageAck for NoopAck {
    async fn ack(&self) -> BusResult<()> {
        Ok(())
    }
}

/// Errors that can occur when using the event bus
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("failed to publish message: {0}")]
    PublishError(String),

    #[error("failed to subscribe to subject: {0}")]
    SubscribeError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("failed to acknowledge message: {0}")]
    AckError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

/// Result type for event bus operations
pub type BusResult<T> = Result<T, BusError>;

/// Core event bus abstraction for publish-subscribe messaging.
///
/// All implementations provide at-least-once delivery with queue-group
/// load balancing and ack-deadline redelivery.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a message to a subject.
    ///
    /// Resolves once the bus has durably accepted the message. Publishing is
    /// fire-and-forget with respect to consumers: delivery happens later,
    /// possibly more than once.
    ///
    /// # Arguments
    /// * `subject` - The subject to publish to (e.g., "user:created")
    /// * `payload` - The message payload as raw bytes (UTF-8 JSON by convention)
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BusResult<()>;

    /// Subscribe to a subject as a member of a queue group.
    ///
    /// Each message on the subject is delivered to exactly one member of the
    /// named group. Every listener registration within one logical service must
    /// use the same stable group name — that identity is what lets replicas of
    /// a service share the stream without duplicate processing.
    ///
    /// Messages must be acked via [`BusMessage::ack`]; unacked messages are
    /// redelivered after the bus's ack deadline.
    async fn subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> BusResult<BoxStream<'static, BusMessage>>;
}

impl fmt::Debug for dyn EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventBus")
    }
}
