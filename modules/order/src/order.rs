//! The Order aggregate of record.

use event_contracts::cart::CartItem;
use event_contracts::order::ShippingAddress;
use replica_store::Versioned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer: String,
    /// Snapshot of the cart lines at checkout.
    pub cart_items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub total_order_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    /// Estimated delivery timestamp, RFC 3339.
    pub delivered_at: String,
    pub version: u64,
}

impl Versioned for Order {
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
