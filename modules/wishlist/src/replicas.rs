//! Event-carried replica of the Product aggregate.

use event_contracts::product::{ProductCreated, ProductUpdated};
use replica_store::{Delta, Versioned};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReplica {
    pub id: String,
    pub merchant_id: String,
    pub title: String,
    pub thumbnail: String,
    pub price: f64,
    pub is_available: bool,
    pub version: u64,
}

impl Versioned for ProductReplica {
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

impl From<ProductCreated> for ProductReplica {
    fn from(event: ProductCreated) -> Self {
        Self {
            id: event.id,
            merchant_id: event.merchant_id,
            title: event.title,
            thumbnail: event.thumbnail,
            price: event.price,
            is_available: event.is_available,
            version: event.version,
        }
    }
}

impl Delta<ProductReplica> for ProductUpdated {
    fn id(&self) -> &str {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn merge_into(&self, target: &mut ProductReplica) {
        if let Some(merchant_id) = &self.merchant_id {
            target.merchant_id = merchant_id.clone();
        }
        if let Some(title) = &self.title {
            target.title = title.clone();
        }
        if let Some(thumbnail) = &self.thumbnail {
            target.thumbnail = thumbnail.clone();
        }
        if let Some(price) = self.price {
            target.price = price;
        }
        if let Some(is_available) = self.is_available {
            target.is_available = is_available;
        }
    }
}
