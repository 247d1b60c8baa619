//! Event-carried replicas of aggregates owned by the commerce service.

use event_contracts::coupon::{CouponCreated, CouponUpdated};
use event_contracts::product::{ProductCreated, ProductImage, ProductUpdated};
use replica_store::{Delta, Versioned};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReplica {
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

impl From<ProductCreated> for ProductReplica {
    fn from(event: ProductCreated) -> Self {
        Self {
            id: event.id,
            merchant_id: event.merchant_id,
            title: event.title,
            description: event.description,
            thumbnail: event.thumbnail,
            images: event.images,
            price: event.price,
            is_used: event.is_used,
            is_available: event.is_available,
            version: event.version,
        }
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
        if let Some(merchant_id) = &self.merchant_id {
            target.merchant_id = merchant_id.clone();
        }
        if let Some(title) = &self.title {
            target.title = title.clone();
        }
        if let Some(description) = &self.description {
            target.description = description.clone();
        }
        if let Some(thumbnail) = &self.thumbnail {
            target.thumbnail = thumbnail.clone();
        }
        if let Some(images) = &self.images {
            target.images = Some(images.clone());
        }
        if let Some(price) = self.price {
            target.price = price;
        }
        if let Some(is_used) = self.is_used {
            target.is_used = is_used;
        }
        if let Some(is_available) = self.is_available {
            target.is_available = is_available;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponReplica {
    pub id: String,
    pub admin: String,
    pub coupon: String,
    pub expire: String,
    pub discount: f64,
    pub version: u64,
}

impl Versioned for CouponReplica {
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

impl From<CouponCreated> for CouponReplica {
    fn from(event: CouponCreated) -> Self {
        Self {
            id: event.id,
            admin: event.admin,
            coupon: event.coupon,
            expire: event.expire,
            discount: event.discount,
            version: event.version,
        }
    }
}

impl Delta<CouponReplica> for CouponUpdated {
    fn id(&self) -> &str {
        &self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn merge_into(&self, target: &mut CouponReplica) {
        if let Some(expire) = &self.expire {
            target.expire = expire.clone();
        }
        if let Some(discount) = self.discount {
            target.discount = discount;
        }
    }
}
