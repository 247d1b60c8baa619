//! Delayed delivery reminders.
//!
//! Each reminder sleeps until its due time in its own task and is then
//! handed to the sink. The SMS/email channel behind the sink is a black
//! box; the default sink just logs what would be sent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub customer_id: String,
    pub customer_phone: String,
    /// Estimated delivery timestamp, RFC 3339; quoted in the message body.
    pub delivered_at: String,
}

#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn deliver(&self, reminder: Reminder);
}

/// Default sink: logs the reminder instead of sending it anywhere.
pub struct LogSink;

#[async_trait]
impl ReminderSink for LogSink {
    async fn deliver(&self, reminder: Reminder) {
        info!(
            customer_id = %reminder.customer_id,
            customer_phone = %reminder.customer_phone,
            delivered_at = %reminder.delivered_at,
            "delivery reminder due"
        );
    }
}

#[derive(Clone)]
pub struct NotifyQueue {
    sink: Arc<dyn ReminderSink>,
}

impl NotifyQueue {
    pub fn new(sink: Arc<dyn ReminderSink>) -> Self {
        Self { sink }
    }

    /// Schedules a reminder `delay` from now. The handle is returned for
    /// tests; the queue itself does not track jobs.
    pub fn schedule(&self, reminder: Reminder, delay: Duration) -> JoinHandle<()> {
        let sink = self.sink.clone();
        info!(
            customer_id = %reminder.customer_id,
            delay_secs = delay.as_secs(),
            "reminder scheduled"
        );
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sink.deliver(reminder).await;
        })
    }
}
