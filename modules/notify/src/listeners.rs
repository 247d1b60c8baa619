//! Subscriptions of the notify service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use event_bus::EventBus;
use event_consumer::spawn_listener;
use event_contracts::order::OrderCreated;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::notify_queue::{NotifyQueue, Reminder};

pub const QUEUE_GROUP: &str = "notify-service";

pub fn spawn_listeners(bus: Arc<dyn EventBus>, queue: NotifyQueue) -> Vec<JoinHandle<()>> {
    let handle = spawn_listener::<OrderCreated, _, _>(bus, QUEUE_GROUP, move |event| {
        let queue = queue.clone();
        async move {
            let delay = match event.delivered_at.parse::<DateTime<Utc>>() {
                Ok(due) => (due - Utc::now()).to_std().unwrap_or(Duration::ZERO),
                Err(err) => {
                    // An unparseable timestamp will not improve on redelivery;
                    // remind immediately rather than drop the order.
                    warn!(order_id = %event.id, error = %err, "bad deliveredAt, reminding now");
                    Duration::ZERO
                }
            };
            queue.schedule(
                Reminder {
                    customer_id: event.customer,
                    customer_phone: event.shipping_address.phone,
                    delivered_at: event.delivered_at,
                },
                delay,
            );
            Ok(())
        }
    });
    vec![handle]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify_queue::ReminderSink;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use event_bus::InMemoryBus;
    use event_contracts::cart::CartItem;
    use event_contracts::order::ShippingAddress;
    use event_contracts::Publisher;
    use tokio::sync::mpsc;

    struct ChannelSink(mpsc::UnboundedSender<Reminder>);

    #[async_trait]
    impl ReminderSink for ChannelSink {
        async fn deliver(&self, reminder: Reminder) {
            self.0.send(reminder).ok();
        }
    }

    #[tokio::test]
    async fn order_created_schedules_a_reminder_for_the_delivery_date() {
        let bus = Arc::new(InMemoryBus::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_listeners(bus.clone(), NotifyQueue::new(Arc::new(ChannelSink(tx))));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let delivered_at = (Utc::now() + ChronoDuration::milliseconds(100)).to_rfc3339();
        Publisher::new(bus)
            .publish(&OrderCreated {
                id: "o1".into(),
                customer: "u1".into(),
                total_order_price: 13.0,
                cart_items: vec![CartItem {
                    product: "p1".into(),
                    quantity: 1,
                    price: 13.0,
                }],
                shipping_address: ShippingAddress {
                    name: "Alice".into(),
                    address: "1 Main St".into(),
                    phone: "+15550001111".into(),
                    city: "Springfield".into(),
                    country: "US".into(),
                    postal_code: "12345".into(),
                },
                delivered_at,
                version: 0,
            })
            .await
            .unwrap();

        let reminder = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reminder.customer_id, "u1");
        assert_eq!(reminder.customer_phone, "+15550001111");
    }
}
