//! Account Record Entity
//!
//! The slice of a user account this layer needs, as returned by the
//! external user store. The store owns the full account; this layer only
//! ever reads it to make authentication decisions.

use crate::domain::UserId;
use crate::domain::value_object::{identity::Identity, user_role::UserRole};

/// Account snapshot from the external user store
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub user_id: UserId,
    pub email: String,
    pub role: UserRole,
    /// Blocked accounts fail authentication even with a valid token
    pub is_blocked: bool,
}

impl AccountRecord {
    pub fn new(user_id: UserId, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            is_blocked: false,
        }
    }

    /// Check if the account may authenticate
    pub fn can_authenticate(&self) -> bool {
        !self.is_blocked
    }

    /// The principal this account authenticates as
    ///
    /// Built from the store's current values, not from token claims, so a
    /// role change takes effect on the next request.
    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id, self.email.clone(), self.role)
    }
}
