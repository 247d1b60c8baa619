//! Authoritative write paths for Product and Coupon. Commit locally first,
//! publish afterwards.

use std::sync::Arc;

use event_contracts::coupon::{CouponCreated, CouponDeleted, CouponUpdated};
use event_contracts::product::{
    ProductCreated, ProductDeleted, ProductImage, ProductUpdated,
};
use event_contracts::{PublishError, Publisher};
use replica_store::{ReplicaStore, StoreError};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::catalog::{Coupon, Product};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("there is no product with id {0}")]
    ProductNotFound(String),
    #[error("there is no coupon with id {0}")]
    CouponNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub merchant_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub images: Option<Vec<ProductImage>>,
    pub price: f64,
    pub is_used: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub images: Option<Vec<ProductImage>>,
    pub price: Option<f64>,
    pub is_used: Option<bool>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub admin: String,
    pub coupon: String,
    pub expire: String,
    pub discount: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CouponPatch {
    pub expire: Option<String>,
    pub discount: Option<f64>,
}

#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ReplicaStore<Product>>,
    coupons: Arc<dyn ReplicaStore<Coupon>>,
    publisher: Publisher,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn ReplicaStore<Product>>,
        coupons: Arc<dyn ReplicaStore<Coupon>>,
        publisher: Publisher,
    ) -> Self {
        Self {
            products,
            coupons,
            publisher,
        }
    }

    pub async fn create_product(&self, new: NewProduct) -> Result<Product, CatalogError> {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            merchant_id: new.merchant_id,
            title: new.title,
            description: new.description,
            thumbnail: new.thumbnail,
            images: new.images,
            price: new.price,
            is_used: new.is_used,
            is_available: true,
            version: 0,
        };
        self.products.insert(product.clone()).await?;

        self.publisher
            .publish(&ProductCreated {
                id: product.id.clone(),
                merchant_id: product.merchant_id.clone(),
                title: product.title.clone(),
                description: product.description.clone(),
                thumbnail: product.thumbnail.clone(),
                images: product.images.clone(),
                price: product.price,
                is_used: product.is_used,
                is_available: product.is_available,
                version: product.version,
            })
            .await?;

        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: &str,
        patch: ProductPatch,
    ) -> Result<Product, CatalogError> {
        let mut product = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))?;

        if let Some(title) = &patch.title {
            product.title = title.clone();
        }
        if let Some(description) = &patch.description {
            product.description = description.clone();
        }
        if let Some(thumbnail) = &patch.thumbnail {
            product.thumbnail = thumbnail.clone();
        }
        if let Some(images) = &patch.images {
            product.images = Some(images.clone());
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(is_used) = patch.is_used {
            product.is_used = is_used;
        }
        if let Some(is_available) = patch.is_available {
            product.is_available = is_available;
        }
        product.version += 1;
        self.products.update(product.clone()).await?;

        self.publisher
            .publish(&ProductUpdated {
                id: product.id.clone(),
                merchant_id: None,
                title: patch.title,
                description: patch.description,
                thumbnail: patch.thumbnail,
                images: patch.images,
                price: patch.price,
                is_used: patch.is_used,
                is_available: patch.is_available,
                version: product.version,
            })
            .await?;

        info!(product_id = %product.id, version = product.version, "product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), CatalogError> {
        if !self.products.remove(id).await? {
            return Err(CatalogError::ProductNotFound(id.to_string()));
        }

        self.publisher
            .publish(&ProductDeleted { id: id.to_string() })
            .await?;

        info!(product_id = %id, "product deleted");
        Ok(())
    }

    pub async fn create_coupon(&self, new: NewCoupon) -> Result<Coupon, CatalogError> {
        let coupon = Coupon {
            id: Uuid::new_v4().to_string(),
            admin: new.admin,
            coupon: new.coupon,
            expire: new.expire,
            discount: new.discount,
            version: 0,
        };
        self.coupons.insert(coupon.clone()).await?;

        self.publisher
            .publish(&CouponCreated {
                id: coupon.id.clone(),
                admin: coupon.admin.clone(),
                coupon: coupon.coupon.clone(),
                expire: coupon.expire.clone(),
                discount: coupon.discount,
                version: coupon.version,
            })
            .await?;

        info!(coupon_id = %coupon.id, "coupon created");
        Ok(coupon)
    }

    pub async fn update_coupon(
        &self,
        id: &str,
        patch: CouponPatch,
    ) -> Result<Coupon, CatalogError> {
        let mut coupon = self
            .coupons
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::CouponNotFound(id.to_string()))?;

        if let Some(expire) = &patch.expire {
            coupon.expire = expire.clone();
        }
        if let Some(discount) = patch.discount {
            coupon.discount = discount;
        }
        coupon.version += 1;
        self.coupons.update(coupon.clone()).await?;

        self.publisher
            .publish(&CouponUpdated {
                id: coupon.id.clone(),
                expire: patch.expire,
                discount: patch.discount,
                version: coupon.version,
            })
            .await?;

        info!(coupon_id = %coupon.id, version = coupon.version, "coupon updated");
        Ok(coupon)
    }

    pub async fn delete_coupon(&self, id: &str) -> Result<(), CatalogError> {
        if !self.coupons.remove(id).await? {
            return Err(CatalogError::CouponNotFound(id.to_string()));
        }

        self.publisher
            .publish(&CouponDeleted { id: id.to_string() })
            .await?;

        info!(coupon_id = %id, "coupon deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::{EventBus, InMemoryBus};
    use futures::StreamExt;
    use replica_store::MemoryStore;
    use std::time::Duration;

    fn service(bus: Arc<InMemoryBus>) -> CatalogService {
        CatalogService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            Publisher::new(bus),
        )
    }

    fn new_lamp() -> NewProduct {
        NewProduct {
            merchant_id: "m1".into(),
            title: "Lamp".into(),
            description: "A lamp".into(),
            thumbnail: "https://cdn/p1.png".into(),
            images: None,
            price: 19.5,
            is_used: false,
        }
    }

    #[tokio::test]
    async fn product_updates_publish_partial_deltas_in_version_order() {
        let bus = Arc::new(InMemoryBus::new());
        let mut events = bus.subscribe("product:updated", "observer").await.unwrap();
        let service = service(bus);

        let product = service.create_product(new_lamp()).await.unwrap();
        service
            .update_product(
                &product.id,
                ProductPatch {
                    price: Some(17.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        service
            .update_product(
                &product.id,
                ProductPatch {
                    is_available: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let first = tokio::time::timeout(Duration::from_secs(1), events.next())
            .await
            .unwrap()
            .unwrap();
        let first: ProductUpdated = serde_json::from_slice(&first.payload).unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(first.price, Some(17.0));
        assert_eq!(first.is_available, None);

        let second = tokio::time::timeout(Duration::from_secs(1), events.next())
            .await
            .unwrap()
            .unwrap();
        let second: ProductUpdated = serde_json::from_slice(&second.payload).unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.is_available, Some(false));
    }

    #[tokio::test]
    async fn coupon_lifecycle_publishes_each_step() {
        let bus = Arc::new(InMemoryBus::new());
        let mut created = bus.subscribe("coupon:created", "observer").await.unwrap();
        let mut deleted = bus.subscribe("coupon:deleted", "observer").await.unwrap();
        let service = service(bus);

        let coupon = service
            .create_coupon(NewCoupon {
                admin: "admin1".into(),
                coupon: "SAVE10".into(),
                expire: "2026-12-31T00:00:00Z".into(),
                discount: 10.0,
            })
            .await
            .unwrap();
        service.delete_coupon(&coupon.id).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), created.next())
            .await
            .unwrap()
            .unwrap();
        let event: CouponCreated = serde_json::from_slice(&event.payload).unwrap();
        assert_eq!(event.coupon, "SAVE10");

        let event = tokio::time::timeout(Duration::from_secs(1), deleted.next())
            .await
            .unwrap()
            .unwrap();
        let event: CouponDeleted = serde_json::from_slice(&event.payload).unwrap();
        assert_eq!(event.id, coupon.id);
    }
}
