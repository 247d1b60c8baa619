//! Authoritative write path for the Order aggregate.
//!
//! Checkout reads only local replicas: the customer comes from the User
//! replica and the priced lines from the Cart replica, so order creation
//! never calls another service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use event_contracts::order::{
    OrderCreated, OrderDeleted, OrderDeletedCart, OrderUpdated, ShippingAddress,
};
use event_contracts::{PublishError, Publisher};
use replica_store::{ReplicaStore, StoreError};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::order::Order;
use crate::replicas::{CartReplica, UserReplica};

const DELIVERY_DAYS: i64 = 5;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("there is no order with id {0}")]
    OrderNotFound(String),
    #[error("there is no customer with id {0}")]
    UnknownCustomer(String),
    #[error("there is no cart with id {0}")]
    UnknownCart(String),
    #[error("cart {cart_id} does not belong to customer {customer_id}")]
    CartOwnership {
        cart_id: String,
        customer_id: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Flat charges added on top of the cart price.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pricing {
    pub tax_price: f64,
    pub shipping_price: f64,
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn ReplicaStore<Order>>,
    users: Arc<dyn ReplicaStore<UserReplica>>,
    carts: Arc<dyn ReplicaStore<CartReplica>>,
    publisher: Publisher,
    pricing: Pricing,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn ReplicaStore<Order>>,
        users: Arc<dyn ReplicaStore<UserReplica>>,
        carts: Arc<dyn ReplicaStore<CartReplica>>,
        publisher: Publisher,
        pricing: Pricing,
    ) -> Self {
        Self {
            orders,
            users,
            carts,
            publisher,
            pricing,
        }
    }

    /// Checkout: snapshots the cart into a new order, then publishes
    /// `order:created` followed by `order:deletedCart` so the cart service
    /// retires the consumed cart.
    pub async fn create_order(
        &self,
        customer_id: &str,
        cart_id: &str,
        shipping_address: ShippingAddress,
    ) -> Result<Order, OrderError> {
        let user = self
            .users
            .get(customer_id)
            .await?
            .ok_or_else(|| OrderError::UnknownCustomer(customer_id.to_string()))?;
        let cart = self
            .carts
            .get(cart_id)
            .await?
            .ok_or_else(|| OrderError::UnknownCart(cart_id.to_string()))?;
        if cart.customer != user.id {
            return Err(OrderError::CartOwnership {
                cart_id: cart.id,
                customer_id: user.id,
            });
        }

        let cart_price = cart.total_price_after_discount.unwrap_or(cart.total_cart_price);
        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer: user.id,
            cart_items: cart.cart_items,
            shipping_address,
            total_order_price: cart_price + self.pricing.tax_price + self.pricing.shipping_price,
            tax_price: self.pricing.tax_price,
            shipping_price: self.pricing.shipping_price,
            delivered_at: (Utc::now() + Duration::days(DELIVERY_DAYS)).to_rfc3339(),
            version: 0,
        };
        self.orders.insert(order.clone()).await?;

        self.publisher
            .publish(&OrderCreated {
                id: order.id.clone(),
                customer: order.customer.clone(),
                total_order_price: order.total_order_price,
                cart_items: order.cart_items.clone(),
                shipping_address: order.shipping_address.clone(),
                delivered_at: order.delivered_at.clone(),
                version: order.version,
            })
            .await?;
        self.publisher
            .publish(&OrderDeletedCart {
                id: cart.id.clone(),
            })
            .await?;

        info!(order_id = %order.id, customer = %order.customer, cart_id = %cart.id, "order created");
        Ok(order)
    }

    pub async fn update_order(
        &self,
        id: &str,
        shipping_address: ShippingAddress,
    ) -> Result<Order, OrderError> {
        let mut order = self
            .orders
            .get(id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(id.to_string()))?;

        order.shipping_address = shipping_address.clone();
        order.version += 1;
        self.orders.update(order.clone()).await?;

        self.publisher
            .publish(&OrderUpdated {
                id: order.id.clone(),
                shipping_address: Some(shipping_address),
                version: order.version,
            })
            .await?;

        info!(order_id = %order.id, version = order.version, "order updated");
        Ok(order)
    }

    pub async fn delete_order(&self, id: &str) -> Result<(), OrderError> {
        if !self.orders.remove(id).await? {
            return Err(OrderError::OrderNotFound(id.to_string()));
        }

        self.publisher
            .publish(&OrderDeleted { id: id.to_string() })
            .await?;

        info!(order_id = %id, "order deleted");
        Ok(())
    }
}
