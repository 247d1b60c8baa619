//! User aggregate events (owned by the auth service).

use crate::{EventData, Subject};
use serde::{Deserialize, Serialize};

/// Account role assigned by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Merchant,
    Customer,
}

/// Published after a user account is committed locally (version 0).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserCreated {
    pub id: String,
    pub email: String,
    pub username: String,
    pub profile_picture: String,
    pub role: Role,
    pub version: u64,
}

/// Partial delta: only changed fields are present, `version` is the new value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdated {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDeleted {
    pub id: String,
}

impl EventData for UserCreated {
    const SUBJECT: Subject = Subject::UserCreated;
}

impl EventData for UserUpdated {
    const SUBJECT: Subject = Subject::UserUpdated;
}

impl EventData for UserDeleted {
    const SUBJECT: Subject = Subject::UserDeleted;
}
