//! Authoritative write path for the User aggregate.
//!
//! Every mutation commits locally first and publishes afterwards. If the
//! publish fails the error surfaces to the caller and the local state stays
//! ahead of downstream replicas until the operation is retried.

use std::sync::Arc;

use event_contracts::user::{Role, UserCreated, UserDeleted, UserUpdated};
use event_contracts::{PublishError, Publisher};
use replica_store::{ReplicaStore, StoreError};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::user::User;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("there is no user with id {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub profile_picture: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Option<Role>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn ReplicaStore<User>>,
    publisher: Publisher,
}

impl UserService {
    pub fn new(store: Arc<dyn ReplicaStore<User>>, publisher: Publisher) -> Self {
        Self { store, publisher }
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, UserError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: new_user.email,
            username: new_user.username,
            profile_picture: new_user.profile_picture,
            role: new_user.role,
            version: 0,
        };
        self.store.insert(user.clone()).await?;

        self.publisher
            .publish(&UserCreated {
                id: user.id.clone(),
                email: user.email.clone(),
                username: user.username.clone(),
                profile_picture: user.profile_picture.clone(),
                role: user.role,
                version: user.version,
            })
            .await?;

        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Applies a partial update, bumps the version, and publishes only the
    /// changed fields.
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, UserError> {
        let mut user = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        if let Some(email) = &patch.email {
            user.email = email.clone();
        }
        if let Some(username) = &patch.username {
            user.username = username.clone();
        }
        if let Some(profile_picture) = &patch.profile_picture {
            user.profile_picture = profile_picture.clone();
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        user.version += 1;
        self.store.update(user.clone()).await?;

        self.publisher
            .publish(&UserUpdated {
                id: user.id.clone(),
                email: patch.email,
                username: patch.username,
                profile_picture: patch.profile_picture,
                role: patch.role,
                version: user.version,
            })
            .await?;

        info!(user_id = %user.id, version = user.version, "user updated");
        Ok(user)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), UserError> {
        if !self.store.remove(id).await? {
            return Err(UserError::NotFound(id.to_string()));
        }

        self.publisher
            .publish(&UserDeleted { id: id.to_string() })
            .await?;

        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::{EventBus, InMemoryBus};
    use futures::StreamExt;
    use replica_store::MemoryStore;
    use std::time::Duration;

    fn service(bus: Arc<InMemoryBus>) -> UserService {
        UserService::new(
            Arc::new(MemoryStore::new()),
            Publisher::new(bus),
        )
    }

    fn new_alice() -> NewUser {
        NewUser {
            email: "alice@example.com".into(),
            username: "alice".into(),
            profile_picture: "https://cdn/alice.png".into(),
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn create_publishes_after_local_commit() {
        let bus = Arc::new(InMemoryBus::new());
        let mut events = bus.subscribe("user:created", "observer").await.unwrap();
        let service = service(bus);

        let user = service.create_user(new_alice()).await.unwrap();
        assert_eq!(user.version, 0);

        let msg = tokio::time::timeout(Duration::from_secs(1), events.next())
            .await
            .unwrap()
            .unwrap();
        let event: UserCreated = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(event.id, user.id);
        assert_eq!(event.version, 0);
    }

    #[tokio::test]
    async fn update_bumps_version_and_carries_only_changed_fields() {
        let bus = Arc::new(InMemoryBus::new());
        let mut events = bus.subscribe("user:updated", "observer").await.unwrap();
        let service = service(bus);

        let user = service.create_user(new_alice()).await.unwrap();
        let updated = service
            .update_user(
                &user.id,
                UserPatch {
                    username: Some("alice2".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.version, 1);
        assert_eq!(updated.email, "alice@example.com");

        let msg = tokio::time::timeout(Duration::from_secs(1), events.next())
            .await
            .unwrap()
            .unwrap();
        let event: UserUpdated = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(event.username.as_deref(), Some("alice2"));
        assert_eq!(event.email, None);
        assert_eq!(event.version, 1);
    }

    #[tokio::test]
    async fn delete_unknown_user_fails_and_publishes_nothing() {
        let bus = Arc::new(InMemoryBus::new());
        let mut events = bus.subscribe("user:deleted", "observer").await.unwrap();
        let service = service(bus);

        let err = service.delete_user("missing").await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(_)));

        let quiet = tokio::time::timeout(Duration::from_millis(100), events.next()).await;
        assert!(quiet.is_err());
    }
}
