//! Collaborator Traits
//!
//! Interfaces this layer consumes but does not implement authoritatively:
//! the user store and durable audit live elsewhere in the storefront
//! backend; the attempt store is process-local but injectable so a shared
//! cache can replace it.

use crate::domain::UserId;
use crate::domain::entity::{account::AccountRecord, login_attempt::LoginAttempt};
use crate::error::GuardResult;

/// External user store
///
/// Lookups are the only suspension points in the authentication path.
#[trait_variant::make(UserStore: Send)]
pub trait LocalUserStore {
    /// Find an account by ID
    async fn find_by_id(&self, user_id: &UserId) -> GuardResult<Option<AccountRecord>>;

    /// Find an account by email
    async fn find_by_email(&self, email: &str) -> GuardResult<Option<AccountRecord>>;
}

/// Durable audit mirror for login attempts
///
/// Fire-and-forget from this layer's perspective; in-memory lockout state
/// is the fast path, this sink is the system of record.
#[trait_variant::make(LoginAuditSink: Send)]
pub trait LocalLoginAuditSink {
    async fn record_attempt(
        &self,
        identifier: &str,
        client: &str,
        success: bool,
    ) -> GuardResult<()>;
}

/// Sliding-window attempt storage for the brute-force guard
///
/// Keys are (identifier, client address). Implementations must apply
/// append/read atomically per key relative to concurrent requests.
#[trait_variant::make(AttemptStore: Send)]
pub trait LocalAttemptStore {
    /// Append an attempt, discarding entries at or before `cutoff_ms`
    async fn append(&self, identifier: &str, client: &str, attempt: LoginAttempt, cutoff_ms: i64);

    /// Attempts newer than `cutoff_ms`, oldest first; prunes the rest
    async fn window(&self, identifier: &str, client: &str, cutoff_ms: i64) -> Vec<LoginAttempt>;

    /// Drop every entry at or before `cutoff_ms` across all keys
    async fn prune(&self, cutoff_ms: i64) -> u64;
}
