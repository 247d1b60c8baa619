//! Subscriptions of the commerce service.

use std::sync::Arc;

use event_bus::EventBus;
use event_consumer::{spawn_listener, ListenerError};
use event_contracts::user::{UserCreated, UserDeleted, UserUpdated};
use replica_store::{apply_created, apply_deleted, apply_updated, ApplyError, ReplicaStore};
use tokio::task::JoinHandle;

use crate::replicas::UserReplica;

/// One stable queue group per logical service: scaled-out instances share
/// deliveries instead of each receiving a copy.
pub const QUEUE_GROUP: &str = "commerce-service";

pub fn spawn_listeners(
    bus: Arc<dyn EventBus>,
    users: Arc<dyn ReplicaStore<UserReplica>>,
) -> Vec<JoinHandle<()>> {
    let created_store = users.clone();
    let created = spawn_listener::<UserCreated, _, _>(bus.clone(), QUEUE_GROUP, move |event| {
        let store = created_store.clone();
        async move {
            apply_created(store.as_ref(), UserReplica::from(event))
                .await
                .map_err(reject)
        }
    });

    let updated_store = users.clone();
    let updated = spawn_listener::<UserUpdated, _, _>(bus.clone(), QUEUE_GROUP, move |event| {
        let store = updated_store.clone();
        async move { apply_updated(store.as_ref(), &event).await.map_err(reject) }
    });

    let deleted_store = users;
    let deleted = spawn_listener::<UserDeleted, _, _>(bus, QUEUE_GROUP, move |event| {
        let store = deleted_store.clone();
        async move { apply_deleted(store.as_ref(), &event.id).await.map_err(reject) }
    });

    vec![created, updated, deleted]
}

fn reject(err: ApplyError) -> ListenerError {
    ListenerError::Reject(err.to_string())
}
