//! Domain Layer
//!
//! Contains entities, value objects, and collaborator traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{account::AccountRecord, login_attempt::{LockoutStatus, LoginAttempt}};
pub use repository::{AttemptStore, LoginAuditSink, UserStore};
pub use value_object::{identity::Identity, user_role::UserRole};

/// User ID owned by the external user store
pub type UserId = kernel::id::UserId;
