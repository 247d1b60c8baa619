//! Subscriptions of the payment service.

use std::sync::Arc;

use event_bus::EventBus;
use event_consumer::{spawn_listener, ListenerError};
use event_contracts::order::{OrderCreated, OrderDeleted, OrderUpdated};
use event_contracts::product::{ProductDeleted, ProductUpdated};
use event_contracts::user::UserDeleted;
use replica_store::{apply_created, apply_deleted, apply_updated, ApplyError, ReplicaStore};
use tokio::task::JoinHandle;

use crate::replicas::{OrderReplica, ProductReplica, UserReplica};

pub const QUEUE_GROUP: &str = "payment-service";

pub fn spawn_listeners(
    bus: Arc<dyn EventBus>,
    orders: Arc<dyn ReplicaStore<OrderReplica>>,
    products: Arc<dyn ReplicaStore<ProductReplica>>,
    users: Arc<dyn ReplicaStore<UserReplica>>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    let store = orders.clone();
    handles.push(spawn_listener::<OrderCreated, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move {
                apply_created(store.as_ref(), OrderReplica::from(event))
                    .await
                    .map_err(reject)
            }
        },
    ));

    let store = orders.clone();
    handles.push(spawn_listener::<OrderUpdated, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move { apply_updated(store.as_ref(), &event).await.map_err(reject) }
        },
    ));

    let store = orders;
    handles.push(spawn_listener::<OrderDeleted, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move { apply_deleted(store.as_ref(), &event.id).await.map_err(reject) }
        },
    ));

    let store = products.clone();
    handles.push(spawn_listener::<ProductUpdated, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move { apply_updated(store.as_ref(), &event).await.map_err(reject) }
        },
    ));

    let store = products;
    handles.push(spawn_listener::<ProductDeleted, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move { apply_deleted(store.as_ref(), &event.id).await.map_err(reject) }
        },
    ));

    let store = users;
    handles.push(spawn_listener::<UserDeleted, _, _>(
        bus,
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move { apply_deleted(store.as_ref(), &event.id).await.map_err(reject) }
        },
    ));

    handles
}

fn reject(err: ApplyError) -> ListenerError {
    ListenerError::Reject(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::InMemoryBus;
    use event_contracts::cart::CartItem;
    use event_contracts::order::ShippingAddress;
    use event_contracts::Publisher;
    use replica_store::MemoryStore;
    use std::time::Duration;

    fn order_created(id: &str) -> OrderCreated {
        OrderCreated {
            id: id.into(),
            customer: "u1".into(),
            total_order_price: 13.0,
            cart_items: vec![CartItem {
                product: "p1".into(),
                quantity: 2,
                price: 5.0,
            }],
            shipping_address: ShippingAddress {
                name: "Alice".into(),
                address: "1 Main St".into(),
                phone: "+15550001111".into(),
                city: "Springfield".into(),
                country: "US".into(),
                postal_code: "12345".into(),
            },
            delivered_at: "2026-09-04T00:00:00Z".into(),
            version: 0,
        }
    }

    #[tokio::test]
    async fn order_lifecycle_is_mirrored() {
        let bus = Arc::new(InMemoryBus::new());
        let orders = Arc::new(MemoryStore::<OrderReplica>::new());
        spawn_listeners(
            bus.clone(),
            orders.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;

        let publisher = Publisher::new(bus);
        publisher.publish(&order_created("o1")).await.unwrap();

        for _ in 0..100 {
            if orders.get("o1").await.unwrap().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let replica = orders.get("o1").await.unwrap().expect("order replicated");
        assert_eq!(replica.total_order_price, 13.0);

        publisher
            .publish(&OrderDeleted { id: "o1".into() })
            .await
            .unwrap();
        for _ in 0..100 {
            if orders.get("o1").await.unwrap().is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(orders.get("o1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_an_unknown_user_does_not_wedge_the_consumer() {
        let bus = Arc::new(InMemoryBus::new());
        let orders = Arc::new(MemoryStore::<OrderReplica>::new());
        spawn_listeners(
            bus.clone(),
            orders.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;

        let publisher = Publisher::new(bus);
        // No user replica exists; the deletion must be absorbed, not retried
        // forever, and later deliveries must still be processed.
        publisher
            .publish(&UserDeleted { id: "nobody".into() })
            .await
            .unwrap();
        publisher.publish(&order_created("o1")).await.unwrap();

        for _ in 0..100 {
            if orders.get("o1").await.unwrap().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(orders.get("o1").await.unwrap().is_some());
    }
}
