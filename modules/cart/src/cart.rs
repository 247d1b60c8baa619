//! The Cart aggregate of record.

use event_contracts::cart::CartItem;
use replica_store::Versioned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    /// Customer user id that owns the cart.
    pub customer: String,
    pub cart_items: Vec<CartItem>,
    pub total_cart_price: f64,
    /// Set once a coupon is applied.
    pub total_price_after_discount: Option<f64>,
    pub version: u64,
}

impl Versioned for Cart {
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
