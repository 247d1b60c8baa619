//! Cart aggregate events (owned by the cart service).

use crate::{EventData, Subject};
use serde::{Deserialize, Serialize};

/// A single line in a cart, priced at the time it was added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product id of the line.
    pub product: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartCreated {
    pub id: String,
    /// Customer user id that owns the cart.
    pub customer: String,
    pub cart_items: Vec<CartItem>,
    pub total_cart_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price_after_discount: Option<f64>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdated {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_items: Option<Vec<CartItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cart_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price_after_discount: Option<f64>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartDeleted {
    pub id: String,
}

impl EventData for CartCreated {
    const SUBJECT: Subject = Subject::CartCreated;
}

impl EventData for CartUpdated {
    const SUBJECT: Subject = Subject::CartUpdated;
}

impl EventData for CartDeleted {
    const SUBJECT: Subject = Subject::CartDeleted;
}
