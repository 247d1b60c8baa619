//! The User aggregate of record.

use event_contracts::user::Role;
use replica_store::Versioned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub profile_picture: String,
    pub role: Role,
    pub version: u64,
}

impl Versioned for User {
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
