//! Wishlists over the local product replica.
//!
//! The wishlist itself is plain per-customer state; the replica supplies
//! current titles and prices, so reading a wishlist never calls the
//! commerce service.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use replica_store::{ReplicaStore, StoreError};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::replicas::ProductReplica;

#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("there is no product with id {0}")]
    ProductNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct WishlistService {
    products: Arc<dyn ReplicaStore<ProductReplica>>,
    wishlists: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl WishlistService {
    pub fn new(products: Arc<dyn ReplicaStore<ProductReplica>>) -> Self {
        Self {
            products,
            wishlists: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Adds a product to a customer's wishlist; the product must exist in
    /// the local replica.
    pub async fn add(&self, customer: &str, product_id: &str) -> Result<(), WishlistError> {
        if self.products.get(product_id).await?.is_none() {
            return Err(WishlistError::ProductNotFound(product_id.to_string()));
        }
        self.wishlists
            .write()
            .await
            .entry(customer.to_string())
            .or_default()
            .insert(product_id.to_string());
        info!(customer, product_id, "product wishlisted");
        Ok(())
    }

    pub async fn remove(&self, customer: &str, product_id: &str) -> bool {
        match self.wishlists.write().await.get_mut(customer) {
            Some(wishlist) => wishlist.remove(product_id),
            None => false,
        }
    }

    /// The customer's wishlist with current replica data. Products deleted
    /// upstream drop out silently.
    pub async fn list(&self, customer: &str) -> Result<Vec<ProductReplica>, WishlistError> {
        let ids: Vec<String> = match self.wishlists.read().await.get(customer) {
            Some(wishlist) => wishlist.iter().cloned().collect(),
            None => return Ok(Vec::new()),
        };
        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = self.products.get(&id).await? {
                products.push(product);
            }
        }
        Ok(products)
    }
}
