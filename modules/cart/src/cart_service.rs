//! Authoritative write path for the Cart aggregate.

use std::sync::Arc;

use event_contracts::cart::{CartCreated, CartDeleted, CartItem, CartUpdated};
use event_contracts::{PublishError, Publisher};
use replica_store::{ReplicaStore, StoreError};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::cart::Cart;
use crate::replicas::{CouponReplica, ProductReplica};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("there is no cart with id {0}")]
    CartNotFound(String),
    #[error("there is no product with id {0}")]
    ProductNotFound(String),
    #[error("product {0} is not available")]
    ProductUnavailable(String),
    #[error("there is no coupon with code {0}")]
    CouponNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// A requested cart line; the price comes from the local product replica.
#[derive(Debug, Clone)]
pub struct LineRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn ReplicaStore<Cart>>,
    products: Arc<dyn ReplicaStore<ProductReplica>>,
    coupons: Arc<dyn ReplicaStore<CouponReplica>>,
    publisher: Publisher,
}

impl CartService {
    pub fn new(
        carts: Arc<dyn ReplicaStore<Cart>>,
        products: Arc<dyn ReplicaStore<ProductReplica>>,
        coupons: Arc<dyn ReplicaStore<CouponReplica>>,
        publisher: Publisher,
    ) -> Self {
        Self {
            carts,
            products,
            coupons,
            publisher,
        }
    }

    /// Prices the requested lines against the local product replicas.
    async fn price_lines(&self, lines: &[LineRequest]) -> Result<Vec<CartItem>, CartError> {
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self
                .products
                .get(&line.product_id)
                .await?
                .ok_or_else(|| CartError::ProductNotFound(line.product_id.clone()))?;
            if !product.is_available {
                return Err(CartError::ProductUnavailable(line.product_id.clone()));
            }
            items.push(CartItem {
                product: product.id,
                quantity: line.quantity,
                price: product.price,
            });
        }
        Ok(items)
    }

    fn total(items: &[CartItem]) -> f64 {
        items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }

    pub async fn create_cart(
        &self,
        customer: &str,
        lines: Vec<LineRequest>,
    ) -> Result<Cart, CartError> {
        let cart_items = self.price_lines(&lines).await?;
        let cart = Cart {
            id: Uuid::new_v4().to_string(),
            customer: customer.to_string(),
            total_cart_price: Self::total(&cart_items),
            cart_items,
            total_price_after_discount: None,
            version: 0,
        };
        self.carts.insert(cart.clone()).await?;

        self.publisher
            .publish(&CartCreated {
                id: cart.id.clone(),
                customer: cart.customer.clone(),
                cart_items: cart.cart_items.clone(),
                total_cart_price: cart.total_cart_price,
                total_price_after_discount: cart.total_price_after_discount,
                version: cart.version,
            })
            .await?;

        info!(cart_id = %cart.id, customer = %cart.customer, "cart created");
        Ok(cart)
    }

    /// Replaces the cart lines and recomputes the total.
    pub async fn update_items(
        &self,
        id: &str,
        lines: Vec<LineRequest>,
    ) -> Result<Cart, CartError> {
        let mut cart = self
            .carts
            .get(id)
            .await?
            .ok_or_else(|| CartError::CartNotFound(id.to_string()))?;

        cart.cart_items = self.price_lines(&lines).await?;
        cart.total_cart_price = Self::total(&cart.cart_items);
        cart.version += 1;
        self.carts.update(cart.clone()).await?;

        self.publisher
            .publish(&CartUpdated {
                id: cart.id.clone(),
                cart_items: Some(cart.cart_items.clone()),
                total_cart_price: Some(cart.total_cart_price),
                total_price_after_discount: None,
                version: cart.version,
            })
            .await?;

        info!(cart_id = %cart.id, version = cart.version, "cart items updated");
        Ok(cart)
    }

    /// Applies a coupon by code, pricing the discount from the local coupon
    /// replica.
    pub async fn apply_coupon(&self, id: &str, code: &str) -> Result<Cart, CartError> {
        let mut cart = self
            .carts
            .get(id)
            .await?
            .ok_or_else(|| CartError::CartNotFound(id.to_string()))?;

        let coupon = self
            .coupons
            .list()
            .await?
            .into_iter()
            .find(|coupon| coupon.coupon == code)
            .ok_or_else(|| CartError::CouponNotFound(code.to_string()))?;

        let discounted = cart.total_cart_price * (1.0 - coupon.discount / 100.0);
        cart.total_price_after_discount = Some(discounted);
        cart.version += 1;
        self.carts.update(cart.clone()).await?;

        self.publisher
            .publish(&CartUpdated {
                id: cart.id.clone(),
                cart_items: None,
                total_cart_price: None,
                total_price_after_discount: Some(discounted),
                version: cart.version,
            })
            .await?;

        info!(cart_id = %cart.id, coupon = %code, "coupon applied");
        Ok(cart)
    }

    pub async fn delete_cart(&self, id: &str) -> Result<(), CartError> {
        if !self.carts.remove(id).await? {
            return Err(CartError::CartNotFound(id.to_string()));
        }

        self.publisher
            .publish(&CartDeleted { id: id.to_string() })
            .await?;

        info!(cart_id = %id, "cart deleted");
        Ok(())
    }

    /// Checkout cleanup, driven by `order:deletedCart`: drops the consumed
    /// cart and tells downstream replica holders. A cart that is already
    /// gone is fine; the event may be redelivered.
    pub async fn retire_cart(&self, id: &str) -> Result<(), CartError> {
        if !self.carts.remove(id).await? {
            info!(cart_id = %id, "retire of absent cart ignored");
            return Ok(());
        }

        self.publisher
            .publish(&CartDeleted { id: id.to_string() })
            .await?;

        info!(cart_id = %id, "cart retired after checkout");
        Ok(())
    }
}
