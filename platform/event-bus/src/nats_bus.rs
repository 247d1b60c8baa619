//! NATS JetStream implementation of the EventBus trait

use crate::{BusError, BusMessage, BusResult, EventBus, MessageAck};
use async_nats::jetstream;
use async_nats::jetstream::consumer::pull;
use async_nats::jetstream::consumer::AckPolicy;
use async_nats::Client;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// EventBus implementation using NATS JetStream
///
/// This is the production implementation. Each subject is backed by its own
/// JetStream stream, and each queue group maps to a durable pull consumer with
/// explicit acks, so:
/// - publishes resolve only after the server has persisted the message
/// - one consumer instance per group receives each message
/// - messages not acked within `ack_wait` are redelivered by the server
///
/// The bus wraps an already-connected `async_nats::Client`; the process owns
/// the connection lifecycle (connect before serving, exit on connection loss).
///
/// # Example
/// ```rust,no_run
/// use event_bus::{EventBus, NatsBus};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let nats_client = async_nats::connect("nats://localhost:4222").await?;
/// let bus = NatsBus::new(nats_client);
///
/// bus.publish("user:created", b"{}".to_vec()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NatsBus {
    client: Client,
    jetstream: jetstream::Context,
    ack_wait: Duration,
    // subjects whose backing stream has already been created this process
    ensured: Arc<Mutex<HashSet<String>>>,
}

impl NatsBus {
    /// Create a new NatsBus from an existing NATS client
    ///
    /// # Arguments
    /// * `client` - An already-connected `async_nats::Client`
    pub fn new(client: Client) -> Self {
        let jetstream = jetstream::new(client.clone());
        Self {
            client,
            jetstream,
            ack_wait: Duration::from_secs(30),
            ensured: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Override the ack deadline applied to consumers created by this bus.
    pub fn with_ack_wait(mut self, ack_wait: Duration) -> Self {
        self.ack_wait = ack_wait;
        self
    }

    /// Get a reference to the underlying NATS client
    ///
    /// Useful for advanced use cases that need direct access to NATS features
    /// not exposed through the EventBus trait.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// JetStream stream names cannot contain `:` or `.`, so the stream backing
    /// a subject is named after it with separators normalized (e.g.
    /// `user:created` -> `USER-CREATED`).
    fn stream_name(subject: &str) -> String {
        subject.replace([':', '.'], "-").to_ascii_uppercase()
    }

    async fn ensure_stream(&self, subject: &str) -> BusResult<jetstream::stream::Stream> {
        let stream = self
            .jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: Self::stream_name(subject),
                subjects: vec![subject.to_string().into()],
                ..Default::default()
            })
            .await
            .map_err(|e| BusError::ConnectionError(format!("failed to ensure stream: {}", e)))?;

        self.ensured.lock().unwrap().insert(subject.to_string());
        Ok(stream)
    }
}

struct JetStreamAck {
    message: jetstream::Message,
}

#[async_trait]
impl MessageAck for JetStreamAck {
    async fn ack(&self) -> BusResult<()> {
        self.message
            .ack()
            .await
            .map_err(|e| BusError::AckError(e.to_string()))
    }
}

#[async_trait]
impl EventBus for NatsBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BusResult<()> {
        if !self.ensured.lock().unwrap().contains(subject) {
            self.ensure_stream(subject).await?;
        }

        let ack = self
            .jetstream
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| BusError::PublishError(e.to_string()))?;

        // Wait for the server's PubAck so callers know the message is durable
        ack.await
            .map_err(|e| BusError::PublishError(e.to_string()))?;

        Ok(())
    }

    async fn subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> BusResult<BoxStream<'static, BusMessage>> {
        let stream = self.ensure_stream(subject).await?;

        let consumer = stream
            .get_or_create_consumer(
                queue_group,
                pull::Config {
                    durable_name: Some(queue_group.to_string()),
                    filter_subject: subject.to_string(),
                    ack_policy: AckPolicy::Explicit,
                    ack_wait: self.ack_wait,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| BusError::SubscribeError(e.to_string()))?;

        let mut messages = consumer
            .messages()
            .await
            .map_err(|e| BusError::SubscribeError(e.to_string()))?;

        let subject_owned = subject.to_string();
        let out = async_stream::stream! {
            while let Some(next) = messages.next().await {
                match next {
                    Ok(message) => {
                        let msg = BusMessage::new(
                            message.subject.to_string(),
                            message.payload.to_vec(),
                        )
                        .with_acker(Arc::new(JetStreamAck { message }));
                        yield msg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            subject = %subject_owned,
                            error = %e,
                            "error receiving message from JetStream consumer"
                        );
                    }
                }
            }
        };

        Ok(out.boxed())
    }
}
