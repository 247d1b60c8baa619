//! Bounded in-process retry for listener handlers.
//!
//! An Updated event whose predecessor has not arrived yet is rejected, and
//! usually only needs a moment before it applies cleanly. A few quick local
//! attempts absorb such reorderings without handing the message back to the
//! bus's much slower ack-deadline redelivery.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ListenerError;

/// Attempts per delivery, counting the first.
const MAX_ATTEMPTS: u32 = 3;
/// Pause before the second attempt; doubles after every failure.
const FIRST_BACKOFF: Duration = Duration::from_millis(100);
/// Cap on the doubling.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Runs the handler up to [`MAX_ATTEMPTS`] times with a doubling pause in
/// between. Returns the final error once attempts are exhausted; the dispatch
/// loop then leaves the message unacked for the bus to redeliver.
pub(crate) async fn run_with_retries<F, Fut>(
    handler: F,
    subject: &str,
) -> Result<(), ListenerError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), ListenerError>>,
{
    let mut backoff = FIRST_BACKOFF;
    let mut attempt = 0;

    loop {
        attempt += 1;
        let err = match handler().await {
            Ok(()) => {
                if attempt > 1 {
                    debug!(subject, attempt, "handler succeeded after retry");
                }
                return Ok(());
            }
            Err(err) => err,
        };

        if attempt >= MAX_ATTEMPTS {
            warn!(subject, attempts = attempt, error = %err, "handler exhausted local retries");
            return Err(err);
        }

        debug!(
            subject,
            attempt,
            backoff_ms = backoff.as_millis() as u64,
            error = %err,
            "handler failed, backing off"
        );
        sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn first_attempt_success_does_not_sleep() {
        let start = tokio::time::Instant::now();
        let result = run_with_retries(|| async { Ok(()) }, "user:created").await;
        assert!(result.is_ok());
        assert!(start.elapsed() < FIRST_BACKOFF);
    }

    #[tokio::test]
    async fn transient_rejection_is_absorbed_locally() {
        let attempts = Arc::new(AtomicU32::new(0));
        let seen = attempts.clone();

        let result = run_with_retries(
            || {
                let seen = seen.clone();
                async move {
                    if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(ListenerError::Reject("predecessor not applied".into()))
                    } else {
                        Ok(())
                    }
                }
            },
            "cart:updated",
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn persistent_rejection_surfaces_after_max_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let seen = attempts.clone();

        let result = run_with_retries(
            || {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Err(ListenerError::Reject("replica missing".into()))
                }
            },
            "cart:updated",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }
}
