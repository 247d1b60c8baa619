//! Subscriptions of the order service.

use std::sync::Arc;

use event_bus::EventBus;
use event_consumer::{spawn_listener, ListenerError};
use event_contracts::cart::{CartCreated, CartDeleted, CartUpdated};
use event_contracts::user::{UserCreated, UserDeleted, UserUpdated};
use replica_store::{apply_created, apply_deleted, apply_updated, ApplyError, ReplicaStore};
use tokio::task::JoinHandle;

use crate::replicas::{CartReplica, UserReplica};

pub const QUEUE_GROUP: &str = "order-service";

pub fn spawn_listeners(
    bus: Arc<dyn EventBus>,
    users: Arc<dyn ReplicaStore<UserReplica>>,
    carts: Arc<dyn ReplicaStore<CartReplica>>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    let store = users.clone();
    handles.push(spawn_listener::<UserCreated, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move {
                apply_created(store.as_ref(), UserReplica::from(event))
                    .await
                    .map_err(reject)
            }
        },
    ));

    let store = users.clone();
    handles.push(spawn_listener::<UserUpdated, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move { apply_updated(store.as_ref(), &event).await.map_err(reject) }
        },
    ));

    let store = users;
    handles.push(spawn_listener::<UserDeleted, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move { apply_deleted(store.as_ref(), &event.id).await.map_err(reject) }
        },
    ));

    let store = carts.clone();
    handles.push(spawn_listener::<CartCreated, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move {
                apply_created(store.as_ref(), CartReplica::from(event))
                    .await
                    .map_err(reject)
            }
        },
    ));

    let store = carts.clone();
    handles.push(spawn_listener::<CartUpdated, _, _>(
        bus.clone(),
        QUEUE_GROUP,
        move |event| {
            let store = store.clone();
            async move { apply_updated(store.as_ref(), &event).await.map_err(reject) }
        },
    ));

    let store = carts;
    handles.push(spawn_listener::<CartDeleted, _, _>(
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
