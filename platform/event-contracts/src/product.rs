//! Product aggregate events (owned by the commerce service).

use crate::{EventData, Subject};
use serde::{Deserialize, Serialize};

/// A hosted product image reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    pub id: String,
    #[serde(rename = "URL")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreated {
    pub id: String,
    pub merchant_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ProductImage>>,
    pub price: f64,
    pub is_used: bool,
    pub is_available: bool,
    pub version: u64,
}

/// Partial delta: only changed fields are present, `version` is the new value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdated {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ProductImage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDeleted {
    pub id: String,
}

impl EventData for ProductCreated {
    const SUBJECT: Subject = Subject::ProductCreated;
}

impl EventData for ProductUpdated {
    const SUBJECT: Subject = Subject::ProductUpdated;
}

impl EventData for ProductDeleted {
    const SUBJECT: Subject = Subject::ProductDeleted;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_uses_camel_case_keys() {
        let event = ProductCreated {
            id: "p1".into(),
            merchant_id: "m1".into(),
            title: "Lamp".into(),
            description: "A lamp".into(),
            thumbnail: "https://cdn/p1.png".into(),
            images: Some(vec![ProductImage {
                id: "i1".into(),
                url: "https://cdn/i1.png".into(),
            }]),
            price: 19.5,
            is_used: false,
            is_available: true,
            version: 1,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("merchantId").is_some());
        assert!(json.get("isAvailable").is_some());
        assert_eq!(json["images"][0]["URL"], "https://cdn/i1.png");
    }

    #[test]
    fn updated_omits_absent_fields() {
        let event = ProductUpdated {
            id: "p1".into(),
            merchant_id: None,
            title: None,
            description: None,
            thumbnail: None,
            images: None,
            price: Some(12.0),
            is_used: None,
            is_available: None,
            version: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"id"));
        assert!(keys.contains(&"price"));
        assert!(keys.contains(&"version"));
    }
}
