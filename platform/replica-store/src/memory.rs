//! In-memory backend, the default for development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{ReplicaStore, StoreError, StoreResult, Versioned};

#[derive(Debug)]
pub struct MemoryStore<T> {
    replicas: Arc<RwLock<HashMap<String, T>>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            replicas: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            replicas: self.replicas.clone(),
        }
    }
}

#[async_trait]
impl<T: Versioned + Clone> ReplicaStore<T> for MemoryStore<T> {
    async fn insert(&self, replica: T) -> StoreResult<()> {
        let mut replicas = self.replicas.write().await;
        if let Some(existing) = replicas.get(replica.id()) {
            return Err(StoreError::AlreadyExists {
                id: replica.id().to_string(),
                current_version: existing.version(),
            });
        }
        replicas.insert(replica.id().to_string(), replica);
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<T>> {
        Ok(self.replicas.read().await.get(id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<T>> {
        Ok(self.replicas.read().await.values().cloned().collect())
    }

    async fn find_by_event(&self, id: &str, event_version: u64) -> StoreResult<Option<T>> {
        let Some(expected) = event_version.checked_sub(1) else {
            return Ok(None);
        };
        let replicas = self.replicas.read().await;
        Ok(replicas
            .get(id)
            .filter(|replica| replica.version() == expected)
            .cloned())
    }

    async fn update(&self, replica: T) -> StoreResult<()> {
        let expected = replica.version().checked_sub(1);
        let mut replicas = self.replicas.write().await;
        match (replicas.get(replica.id()), expected) {
            (Some(existing), Some(expected)) if existing.version() == expected => {
                replicas.insert(replica.id().to_string(), replica);
                Ok(())
            }
            _ => Err(StoreError::VersionConflict {
                id: replica.id().to_string(),
                expected: expected.unwrap_or(0),
            }),
        }
    }

    async fn remove(&self, id: &str) -> StoreResult<bool> {
        Ok(self.replicas.write().await.remove(id).is_some())
    }
}
