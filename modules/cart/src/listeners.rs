//! Subscriptions of the cart service.

use std::sync::Arc;

use event_bus::EventBus;
use event_consumer::{spawn_listener, ListenerError};
use event_contracts::coupon::{CouponCreated, CouponDeleted, CouponUpdated};
use event_contracts::order::OrderDeletedCart;
use event_contracts::product::{ProductCreated, ProductDeleted, ProductUpdated};
use replica_store::{apply_created, apply_deleted, apply_updated, ApplyError, ReplicaStore};
use tokio::task::JoinHandle;

use crate::cart_service::CartService;
use crate::replicas::{CouponReplica, ProductReplica};

pub const QUEUE_GROUP: &str = "cart-service";

pub fn spawn_listeners(
    bus: Arc<dyn EventBus>,
    products: Arc<dyn ReplicaStore<ProductReplica>>,
    coupons: Arc<dyn ReplicaStore<CouponReplica>>,
    cart_service: CartService,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    let store = products.clone();
    handles.push(spawn_listener::<ProductCreated, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move {
                apply_created(store.as_ref(), ProductReplica::from(event))
                    .await
                    .map_err(reject)
            }
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

    let store = coupons.clone();
    handles.push(spawn_listener::<CouponCreated, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move {
                apply_created(store.as_ref(), CouponReplica::from(event))
                    .await
                    .map_err(reject)
            }
        },
    ));

    let store = coupons.clone();
    handles.push(spawn_listener::<CouponUpdated, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move { apply_updated(store.as_ref(), &event).await.map_err(reject) }
        },
    ));

    let store = coupons;
    handles.push(spawn_listener::<CouponDeleted, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move { apply_deleted(store.as_ref(), &event.id).await.map_err(reject) }
        },
    ));

    // Checkout cascade: the order service retires the consumed cart.
    handles.push(spawn_listener::<OrderDeletedCart, _, _>(
        bus,
        QUEUE_GROUP,
        move |event| {
            let service = cart_service.clone();
            async move {
                service
                    .retire_cart(&event.id)
                    .await
                    .map_err(|err| ListenerError::Reject(err.to_string()))
            }
        },
    ));

    handles
}

fn reject(err: ApplyError) -> ListenerError {
    ListenerError::Reject(err.to_string())
}
