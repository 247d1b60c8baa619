//! Event-carried replicas of the User and Cart aggregates.

use event_contracts::cart::{CartCreated, CartItem, CartUpdated};
use event_contracts::user::{Role, UserCreated, UserUpdated};
use replica_store::{Delta, Versioned};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReplica {
    pub id: String,
    pub email: String,
    pub username: String,
    pub profile_picture: String,
    pub role: Role,
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

impl From<UserCreated> for UserReplica {
    fn from(event: UserCreated) -> Self {
        Self {
            id: event.id,
            email: event.email,
            username: event.username,
            profile_picture: event.profile_picture,
            role: event.role,
            version: event.version,
        }
    }
}

impl Delta<UserReplica> for UserUpdated {
    fn id(&self) -> &str {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn merge_into(&self, target: &mut UserReplica) {
        if let Some(email) = &self.email {
            target.email = email.clone();
        }
        if let Some(username) = &self.username {
            target.username = username.clone();
        }
        if let Some(profile_picture) = &self.profile_picture {
            target.profile_picture = profile_picture.clone();
        }
        if let Some(role) = self.role {
            target.role = role;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartReplica {
    pub id: String,
    pub customer: String,
    pub cart_items: Vec<CartItem>,
    pub total_cart_price: f64,
    pub total_price_after_discount: Option<f64>,
    pub version: u64,
}

impl Versioned for CartReplica {
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

impl From<CartCreated> for CartReplica {
    fn from(event: CartCreated) -> Self {
        Self {
            id: event.id,
            customer: event.customer,
            cart_items: event.cart_items,
            total_cart_price: event.total_cart_price,
            total_price_after_discount: event.total_price_after_discount,
            version: event.version,
        }
    }
}

impl Delta<CartReplica> for CartUpdated {
    fn id(&self) -> &str {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn merge_into(&self, target: &mut CartReplica) {
        if let Some(cart_items) = &self.cart_items {
            target.cart_items = cart_items.clone();
        }
        if let Some(total_cart_price) = self.total_cart_price {
            target.total_cart_price = total_cart_price;
        }
        if let Some(total_price_after_discount) = self.total_price_after_discount {
            target.total_price_after_discount = Some(total_price_after_discount);
        }
    }
}
