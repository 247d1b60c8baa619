//! Event-carried replica of the User aggregate owned by the auth service.

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
