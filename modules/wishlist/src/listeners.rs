//! Subscriptions of the wishlist service.

use std::sync::Arc;

use event_bus::EventBus;
use event_consumer::{spawn_listener, ListenerError};
use event_contracts::product::{ProductCreated, ProductDeleted, ProductUpdated};
use replica_store::{apply_created, apply_deleted, apply_updated, ApplyError, ReplicaStore};
use tokio::task::JoinHandle;

use crate::replicas::ProductReplica;

pub const QUEUE_GROUP: &str = "wishlist-service";

pub fn spawn_listeners(
    bus: Arc<dyn EventBus>,
    products: Arc<dyn ReplicaStore<ProductReplica>>,
) -> Vec<JoinHandle<()>> {
    let created_store = products.clone();
    let created = spawn_listener::<ProductCreated, _, _>(bus.clone(), QUEUE_GROUP, move |event| {
        let store = created_store.clone();
        async move {
            apply_created(store.as_ref(), ProductReplica::from(event))
                .await
                .map_err(reject)
        }
    });

    let updated_store = products.clone();
    let updated = spawn_listener::<ProductUpdated, _, _>(bus.clone(), QUEUE_GROUP, move |event| {
        let store = updated_store.clone();
        async move { apply_updated(store.as_ref(), &event).await.map_err(reject) }
    });

    let deleted_store = products;
    let deleted = spawn_listener::<ProductDeleted, _, _>(bus, QUEUE_GROUP, move |event| {
        let store = deleted_store.clone();
        async move { apply_deleted(store.as_ref(), &event.id).await.map_err(reject) }
    });

    vec![created, updated, deleted]
}

fn reject(err: ApplyError) -> ListenerError {
    ListenerError::Reject(err.to_string())
}
