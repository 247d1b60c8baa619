//! Versioned aggregate store for event-carried replicas.
//!
//! Each listening service keeps a local copy of the aggregates it needs.
//! Replicas carry the version number assigned by the owning service, and an
//! Updated event applies only when the stored version is exactly one behind
//! the event's version. That precondition, plus compare-and-swap updates,
//! gives per-aggregate ordering on top of at-least-once delivery.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// An aggregate replica identified by id and carrying the owner's version.
pub trait Versioned: Send + Sync + 'static {
    fn id(&self) -> &str;
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
}

/// A partial update carried by an Updated event.
///
/// `version` is the NEW version the event assigns. `merge_into` copies only
/// the fields the event carries and never touches the version; the apply
/// algorithm sets it after the merge.
pub trait Delta<T: Versioned>: Send + Sync {
    fn id(&self) -> &str;
    fn version(&self) -> u64;
    fn merge_into(&self, target: &mut T);
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("aggregate {id} already exists at version {current_version}")]
    AlreadyExists { id: String, current_version: u64 },
    #[error("version conflict on aggregate {id}: stored version is not {expected}")]
    VersionConflict { id: String, expected: u64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("replica serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage backend for one aggregate kind.
#[async_trait]
pub trait ReplicaStore<T: Versioned>: Send + Sync {
    /// Inserts a new replica. Fails with [`StoreError::AlreadyExists`] when
    /// the id is present; never overwrites.
    async fn insert(&self, replica: T) -> StoreResult<()>;

    async fn get(&self, id: &str) -> StoreResult<Option<T>>;

    /// All replicas, for diagnostics and tests.
    async fn list(&self) -> StoreResult<Vec<T>>;

    /// The precondition lookup for an Updated event: the replica whose stored
    /// version is exactly `event_version - 1`, if such a row exists.
    async fn find_by_event(&self, id: &str, event_version: u64) -> StoreResult<Option<T>>;

    /// Compare-and-swap write: commits only when the stored version is
    /// exactly `replica.version() - 1`, otherwise
    /// [`StoreError::VersionConflict`].
    async fn update(&self, replica: T) -> StoreResult<()>;

    /// Removes the replica. Returns whether anything was removed.
    async fn remove(&self, id: &str) -> StoreResult<bool>;
}

#[derive(Debug, Error)]
pub enum ApplyError {
    /// The replica the event depends on is not present at the expected
    /// version. The caller should reject the delivery and let the bus
    /// redeliver once the predecessor has been applied.
    #[error("no replica of {id} at version {event_version} - 1")]
    MissingPredecessor { id: String, event_version: u64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Applies a Created event. A duplicate delivery races against the first
/// insert; losing that race means the replica is already there, which is
/// success, not failure.
pub async fn apply_created<T, S>(store: &S, replica: T) -> Result<(), ApplyError>
where
    T: Versioned,
    S: ReplicaStore<T> + ?Sized,
{
    match store.insert(replica).await {
        Ok(()) => Ok(()),
        Err(StoreError::AlreadyExists { id, current_version }) => {
            debug!(id, current_version, "duplicate creation ignored");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Applies an Updated event: predecessor lookup, field merge, CAS write.
///
/// Rejects when the stored version is not exactly one behind the event,
/// which covers both out-of-order arrival and duplicate delivery. A CAS
/// conflict (a concurrent applier won) takes the same reject path.
pub async fn apply_updated<T, S, D>(store: &S, delta: &D) -> Result<(), ApplyError>
where
    T: Versioned,
    S: ReplicaStore<T> + ?Sized,
    D: Delta<T>,
{
    let event_version = delta.version();
    let Some(mut replica) = store.find_by_event(delta.id(), event_version).await? else {
        return Err(ApplyError::MissingPredecessor {
            id: delta.id().to_string(),
            event_version,
        });
    };
    delta.merge_into(&mut replica);
    replica.set_version(event_version);
    store.update(replica).await?;
    Ok(())
}

/// Applies a Deleted event. An absent replica is a no-op success so that a
/// redelivered Deleted cannot wedge the consumer.
pub async fn apply_deleted<T, S>(store: &S, id: &str) -> Result<(), ApplyError>
where
    T: Versioned,
    S: ReplicaStore<T> + ?Sized,
{
    let removed = store.remove(id).await?;
    if !removed {
        debug!(id, "delete of absent replica ignored");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) struct Widget {
        pub id: String,
        pub label: String,
        pub price: f64,
        pub version: u64,
    }

    impl Versioned for Widget {
        fn id(&self) -> &str {
            &self.id
        }
        fn version(&self) -> u64 {
            self.version
        }
        fn set_version(&mut self, version: u64) {
            self.version = version;
        }
    }

    pub(crate) struct WidgetDelta {
        pub id: String,
        pub label: Option<String>,
        pub price: Option<f64>,
        pub version: u64,
    }

    impl Delta<Widget> for WidgetDelta {
        fn id(&self) -> &str {
            &self.id
        }
        fn version(&self) -> u64 {
            self.version
        }
        fn merge_into(&self, target: &mut Widget) {
            if let Some(label) = &self.label {
                target.label = label.clone();
            }
            if let Some(price) = self.price {
                target.price = price;
            }
        }
    }

    fn widget(version: u64) -> Widget {
        Widget {
            id: "w1".into(),
            label: "lamp".into(),
            price: 10.0,
            version,
        }
    }

    fn relabel(version: u64, label: &str) -> WidgetDelta {
        WidgetDelta {
            id: "w1".into(),
            label: Some(label.into()),
            price: None,
            version,
        }
    }

    #[tokio::test]
    async fn created_then_updated_converges() {
        let store = MemoryStore::new();
        apply_created(&store, widget(0)).await.unwrap();
        apply_updated(&store, &relabel(1, "desk lamp")).await.unwrap();

        let stored = store.get("w1").await.unwrap().unwrap();
        assert_eq!(stored.label, "desk lamp");
        assert_eq!(stored.price, 10.0);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn duplicate_creation_is_a_no_op() {
        let store = MemoryStore::new();
        apply_created(&store, widget(0)).await.unwrap();
        apply_updated(&store, &relabel(1, "desk lamp")).await.unwrap();

        // Redelivered Created must not clobber the advanced replica.
        apply_created(&store, widget(0)).await.unwrap();
        let stored = store.get("w1").await.unwrap().unwrap();
        assert_eq!(stored.label, "desk lamp");
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn out_of_order_update_rejected_until_predecessor_applies() {
        let store = MemoryStore::new();
        apply_created(&store, widget(0)).await.unwrap();

        let err = apply_updated(&store, &relabel(2, "v2 label")).await.unwrap_err();
        assert!(matches!(err, ApplyError::MissingPredecessor { event_version: 2, .. }));

        apply_updated(&store, &relabel(1, "v1 label")).await.unwrap();
        apply_updated(&store, &relabel(2, "v2 label")).await.unwrap();
        let stored = store.get("w1").await.unwrap().unwrap();
        assert_eq!(stored.label, "v2 label");
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn duplicate_update_rejected_and_state_unchanged() {
        let store = MemoryStore::new();
        apply_created(&store, widget(0)).await.unwrap();
        apply_updated(&store, &relabel(1, "first")).await.unwrap();

        let err = apply_updated(&store, &relabel(1, "second")).await.unwrap_err();
        assert!(matches!(err, ApplyError::MissingPredecessor { .. }));
        let stored = store.get("w1").await.unwrap().unwrap();
        assert_eq!(stored.label, "first");
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn update_after_delete_stays_rejected() {
        let store = MemoryStore::new();
        apply_created(&store, widget(0)).await.unwrap();
        apply_deleted(&store, "w1").await.unwrap();

        let err = apply_updated(&store, &relabel(1, "ghost")).await.unwrap_err();
        assert!(matches!(err, ApplyError::MissingPredecessor { .. }));
        assert!(store.get("w1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_of_absent_replica_is_a_no_op() {
        let store: MemoryStore<Widget> = MemoryStore::new();
        apply_deleted(&store, "nobody").await.unwrap();
        apply_created(&store, widget(0)).await.unwrap();
        apply_deleted(&store, "w1").await.unwrap();
        apply_deleted(&store, "w1").await.unwrap();
        assert!(store.get("w1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_touches_only_carried_fields() {
        let store = MemoryStore::new();
        apply_created(&store, widget(0)).await.unwrap();
        apply_updated(
            &store,
            &WidgetDelta {
                id: "w1".into(),
                label: None,
                price: Some(12.5),
                version: 1,
            },
        )
        .await
        .unwrap();

        let stored = store.get("w1").await.unwrap().unwrap();
        assert_eq!(stored.label, "lamp");
        assert_eq!(stored.price, 12.5);
        assert_eq!(stored.version, 1);
    }
}
