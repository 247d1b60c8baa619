//! Order aggregate events (owned by the order service).

use crate::cart::CartItem;
use crate::{EventData, Subject};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub id: String,
    pub customer: String,
    pub total_order_price: f64,
    /// Snapshot of the cart lines at checkout.
    pub cart_items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    /// Estimated delivery timestamp, RFC 3339.
    pub delivered_at: String,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdated {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDeleted {
    pub id: String,
}

/// Emitted after checkout so the cart service drops the consumed cart.
/// Carries the cart id, not the order id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDeletedCart {
    pub id: String,
}

impl EventData for OrderCreated {
    const SUBJECT: Subject = Subject::OrderCreated;
}

impl EventData for OrderUpdated {
    const SUBJECT: Subject = Subject::OrderUpdated;
}

impl EventData for OrderDeleted {
    const SUBJECT: Subject = Subject::OrderDeleted;
}

impl EventData for OrderDeletedCart {
    const SUBJECT: Subject = Subject::OrderDeletedCart;
}
