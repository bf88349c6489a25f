//! Identity Value Object
//!
//! The minimal principal attached to a request after successful
//! verification. Owned by the external user store; never persisted here.

use serde::Serialize;

use crate::domain::UserId;
use crate::domain::value_object::user_role::UserRole;

/// Authenticated principal
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Subject ID
    #[serde(rename = "id")]
    pub user_id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl Identity {
    pub fn new(user_id: UserId, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id && self.email == other.email && self.role == other.role
    }
}

impl Eq for Identity {}
