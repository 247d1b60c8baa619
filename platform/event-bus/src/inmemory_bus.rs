//! In-memory implementation of the EventBus trait for testing and development

use crate::{BusMessage, BusResult, EventBus, MessageAck};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// EventBus implementation using in-memory channels
///
/// This implementation is suitable for:
/// - Unit tests (no external dependencies)
/// - Local development without Docker
/// - Integration tests that need fast, isolated message buses
///
/// It models the same delivery contract as the NATS implementation:
/// - each (subject, queue group) pair gets its own delivery queue
/// - a message goes to exactly one member of a group, round-robin
/// - a message that is not acked within `ack_wait` is redelivered
/// - distinct groups on the same subject each receive every message
///
/// Subscribers must exist before publishing; messages published to a subject
/// with no registered groups are dropped.
///
/// # Example
/// ```rust
/// use event_bus::{EventBus, InMemoryBus};
/// use futures::StreamExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bus = InMemoryBus::new();
///
/// // Subscribe before publishing
/// let mut stream = bus.subscribe("cart:created", "order-service").await?;
///
/// bus.publish("cart:created", b"{}".to_vec()).await?;
///
/// let msg = stream.next().await.unwrap();
/// assert_eq!(msg.subject, "cart:created");
/// msg.ack().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryBus {
    inner: Arc<Inner>,
}

struct Inner {
    ack_wait: Duration,
    // keyed by (subject, queue group); groups are created on first subscribe
    groups: Mutex<HashMap<(String, String), Arc<Group>>>,
}

struct Group {
    subject: String,
    name: String,
    members: Mutex<Vec<mpsc::UnboundedSender<BusMessage>>>,
    rr: AtomicUsize,
    // delivery id -> payload, removed on ack
    pending: Mutex<HashMap<u64, Vec<u8>>>,
    next_delivery: AtomicU64,
}

impl Group {
    fn new(subject: &str, name: &str) -> Self {
        Self {
            subject: subject.to_string(),
            name: name.to_string(),
            members: Mutex::new(Vec::new()),
            rr: AtomicUsize::new(0),
            pending: Mutex::new(HashMap::new()),
            next_delivery: AtomicU64::new(0),
        }
    }

    /// Track the message as pending, deliver it to one member, and start the
    /// redelivery watchdog. The watchdog keeps redelivering at `ack_wait`
    /// intervals until the message is acked.
    fn begin_delivery(self: &Arc<Self>, payload: Vec<u8>, ack_wait: Duration) {
        let id = self.next_delivery.fetch_add(1, Ordering::Relaxed);
        self.pending.lock().unwrap().insert(id, payload);
        self.send_to_member(id);

        let group = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(ack_wait).await;
                if !group.pending.lock().unwrap().contains_key(&id) {
                    break;
                }
                tracing::debug!(
                    subject = %group.subject,
                    queue_group = %group.name,
                    delivery_id = id,
                    "redelivering unacked message"
                );
                group.send_to_member(id);
            }
        });
    }

    /// Deliver one pending message to the next live member, round-robin.
    /// Members whose receiver has been dropped are pruned on the way.
    fn send_to_member(self: &Arc<Self>, id: u64) {
        let payload = match self.pending.lock().unwrap().get(&id) {
            Some(p) => p.clone(),
            None => return, // acked in the meantime
        };

        let msg = BusMessage::new(self.subject.clone(), payload).with_acker(Arc::new(
            InMemoryAck {
                group: Arc::clone(self),
                delivery_id: id,
            },
        ));

        let mut members = self.members.lock().unwrap();
        while !members.is_empty() {
            let idx = self.rr.fetch_add(1, Ordering::Relaxed) % members.len();
            if members[idx].send(msg.clone()).is_ok() {
                return;
            }
            members.remove(idx);
        }
        // No live members; the message stays pending and the watchdog retries.
    }
}

struct InMemoryAck {
    group: Arc<Group>,
    delivery_id: u64,
}

#[async_trait]
impl MessageAck for InMemoryAck {
    async fn ack(&self) -> BusResult<()> {
        self.group.pending.lock().unwrap().remove(&self.delivery_id);
        Ok(())
    }
}

impl InMemoryBus {
    /// Create a new in-memory event bus with the default ack deadline (500ms).
    pub fn new() -> Self {
        Self::with_ack_wait(Duration::from_millis(500))
    }

    /// Create a new in-memory event bus with a custom ack deadline.
    ///
    /// Tests exercising redelivery usually want a short deadline so unacked
    /// messages come back quickly.
    pub fn with_ack_wait(ack_wait: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                ack_wait,
                groups: Mutex::new(HashMap::new()),
            }),
        }
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BusResult<()> {
        let groups: Vec<Arc<Group>> = self
            .inner
            .groups
            .lock()
            .unwrap()
            .values()
            .filter(|g| g.subject == subject)
            .cloned()
            .collect();

        for group in groups {
            group.begin_delivery(payload.clone(), self.inner.ack_wait);
        }

        Ok(())
    }

    async fn subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> BusResult<BoxStream<'static, BusMessage>> {
        let group = self
            .inner
            .groups
            .lock()
            .unwrap()
            .entry((subject.to_string(), queue_group.to_string()))
            .or_insert_with(|| Arc::new(Group::new(subject, queue_group)))
            .clone();

        let (tx, mut rx) = mpsc::unbounded_channel();
        group.members.lock().unwrap().push(tx);

        let stream = async_stream::stream! {
            while let Some(msg) = rx.recv().await {
                yield msg;
            }
        };

        Ok(stream.boxed())
    }
}
