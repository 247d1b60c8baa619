//! Product and Coupon aggregates of record.

use event_contracts::product::ProductImage;
use replica_store::Versioned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub merchant_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub images: Option<Vec<ProductImage>>,
    pub price: f64,
    pub is_used: bool,
    pub is_available: bool,
    pub version: u64,
}

impl Versioned for Product {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    /// Admin user that issued the coupon.
    pub admin: String,
    pub coupon: String,
    pub expire: String,
    pub discount: f64,
    pub version: u64,
}

impl Versioned for Coupon {
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
