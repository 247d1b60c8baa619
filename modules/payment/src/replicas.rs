//! Replicas the payment service keeps to invoice orders.
//!
//! Only the fields the payment flow reads are replicated; the rest of each
//! upstream aggregate stays with its owner.

use event_contracts::cart::CartItem;
use event_contracts::order::{OrderCreated, OrderUpdated, ShippingAddress};
use event_contracts::product::ProductUpdated;
use replica_store::{Delta, Versioned};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReplica {
    pub id: String,
    pub customer: String,
    pub cart_items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub total_order_price: f64,
    pub delivered_at: String,
    pub version: u64,
}

impl Versioned for OrderReplica {
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

impl From<OrderCreated> for OrderReplica {
    fn from(event: OrderCreated) -> Self {
        Self {
            id: event.id,
            customer: event.customer,
            cart_items: event.cart_items,
            shipping_address: event.shipping_address,
            total_order_price: event.total_order_price,
            delivered_at: event.delivered_at,
            version: event.version,
        }
    }
}

impl Delta<OrderReplica> for OrderUpdated {
    fn id(&self) -> &str {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn merge_into(&self, target: &mut OrderReplica) {
        if let Some(shipping_address) = &self.shipping_address {
            target.shipping_address = shipping_address.clone();
        }
    }
}

/// Price-relevant slice of the Product aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReplica {
    pub id: String,
    pub title: String,
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

impl Delta<ProductReplica> for ProductUpdated {
    fn id(&self) -> &str {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn merge_into(&self, target: &mut ProductReplica) {
        if let Some(title) = &self.title {
            target.title = title.clone();
        }
        if let Some(price) = self.price {
            target.price = price;
        }
        if let Some(is_available) = self.is_available {
            target.is_available = is_available;
        }
    }
}

/// Bare customer record; only deletions matter to payment collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReplica {
    pub id: String,
    pub version: u64,
}

impl Versioned for UserReplica {
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
