//! Coupon events (owned by the commerce service).

use crate::{EventData, Subject};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CouponCreated {
    pub id: String,
    /// Admin user that issued the coupon.
    pub admin: String,
    /// The redeemable coupon code.
    pub coupon: String,
    /// Expiry timestamp, RFC 3339.
    pub expire: String,
    /// Percentage discount, 0.0..=100.0.
    pub discount: f64,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CouponUpdated {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CouponDeleted {
    pub id: String,
}

impl EventData for CouponCreated {
    const SUBJECT: Subject = Subject::CouponCreated;
}

impl EventData for CouponUpdated {
    const SUBJECT: Subject = Subject::CouponUpdated;
}

impl EventData for CouponDeleted {
    const SUBJECT: Subject = Subject::CouponDeleted;
}
