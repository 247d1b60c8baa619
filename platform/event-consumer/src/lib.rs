//! Listener dispatch loop: subscribe, decode, handle, ack.
//!
//! One generic [`spawn_listener`] replaces per-subject listener types. The
//! handler decides the outcome through its `Result`; the loop owns the ack:
//! a message is acked only after the handler succeeds, so a failed handler
//! leaves the message pending and the bus redelivers it after the ack wait.

use std::future::Future;
use std::sync::Arc;

use event_bus::EventBus;
use event_contracts::EventData;
use futures::StreamExt;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

mod retry;

/// How a handler failed. Either way the message stays unacked and the bus
/// redelivers it; the variants only shape the logging.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// A precondition is not yet met (missing aggregate, version gap). The
    /// message is expected to apply cleanly on a later delivery.
    #[error("rejected: {0}")]
    Reject(String),
    /// The payload could not be decoded. Redelivery will not help, but the
    /// loop must not ack what it did not process.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Spawns a dispatch loop for one event type under one queue group.
///
/// Handler errors are retried in-process with backoff before giving up on
/// the delivery; exhausted retries leave the message unacked. The loop
/// itself never exits on handler failure.
pub fn spawn_listener<T, F, Fut>(
    bus: Arc<dyn EventBus>,
    queue_group: &str,
    handler: F,
) -> JoinHandle<()>
where
    T: EventData + Clone,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ListenerError>> + Send,
{
    let queue_group = queue_group.to_string();
    tokio::spawn(async move {
        let subject = T::SUBJECT.as_str();
        let mut stream = match bus.subscribe(subject, &queue_group).await {
            Ok(stream) => stream,
            Err(err) => {
                error!(subject, queue_group, error = %err, "subscribe failed, listener not started");
                return;
            }
        };
        debug!(subject, queue_group, "listener started");

        while let Some(message) = stream.next().await {
            let data: T = match serde_json::from_slice(&message.payload) {
                Ok(data) => data,
                Err(err) => {
                    // Left unacked: we must not ack what we did not process,
                    // even though redelivery cannot fix a bad payload.
                    error!(subject, queue_group, error = %err, "malformed payload, skipping");
                    continue;
                }
            };

            let outcome = retry::run_with_retries(|| handler(data.clone()), subject).await;

            match outcome {
                Ok(()) => {
                    if let Err(err) = message.ack().await {
                        warn!(subject, queue_group, error = %err, "ack failed, message will redeliver");
                    }
                }
                Err(err) => {
                    warn!(subject, queue_group, error = %err, "handler failed, leaving unacked for redelivery");
                }
            }
        }
        debug!(subject, queue_group, "listener stream ended");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::InMemoryBus;
    use event_contracts::user::UserDeleted;
    use event_contracts::Publisher;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn acks_after_successful_handling() {
        let bus = Arc::new(InMemoryBus::with_ack_wait(Duration::from_millis(50)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_listener::<UserDeleted, _, _>(bus.clone(), "test-group", move |event| {
            let tx = tx.clone();
            async move {
                tx.send(event.id).ok();
                Ok(())
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        Publisher::new(bus)
            .publish(&UserDeleted { id: "u1".into() })
            .await
            .unwrap();

        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, "u1");

        // Acked, so the ack-wait must pass without a redelivery.
        let redelivered = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(redelivered.is_err());
    }

    #[tokio::test]
    async fn failed_handler_leaves_message_for_redelivery() {
        let bus = Arc::new(InMemoryBus::with_ack_wait(Duration::from_millis(50)));
        let attempts = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let seen = attempts.clone();
        spawn_listener::<UserDeleted, _, _>(bus.clone(), "test-group", move |event| {
            let seen = seen.clone();
            let tx = tx.clone();
            async move {
                // Fail until the second bus delivery.
                if seen.fetch_add(1, Ordering::SeqCst) < 3 {
                    Err(ListenerError::Reject("replica not present yet".into()))
                } else {
                    tx.send(event.id).ok();
                    Ok(())
                }
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        Publisher::new(bus)
            .publish(&UserDeleted { id: "u2".into() })
            .await
            .unwrap();

        // The in-process retries (3 attempts) exhaust on the first delivery;
        // the redelivered copy succeeds on its first attempt.
        let id = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id, "u2");
        assert!(attempts.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn malformed_payload_does_not_crash_the_loop() {
        let bus = Arc::new(InMemoryBus::with_ack_wait(Duration::from_secs(5)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_listener::<UserDeleted, _, _>(bus.clone(), "test-group", move |event| {
            let tx = tx.clone();
            async move {
                tx.send(event.id).ok();
                Ok(())
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        bus.publish("user:deleted", b"not json".to_vec()).await.unwrap();
        Publisher::new(bus)
            .publish(&UserDeleted { id: "u3".into() })
            .await
            .unwrap();

        let id = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id, "u3");
    }
}
