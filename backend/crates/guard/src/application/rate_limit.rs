//! Rate Limiter Service
//!
//! Thin application service over the injectable store plus the named
//! per-route policies the storefront mounts.

use std::sync::Arc;

use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateLimitStore};

use crate::error::{GuardError, GuardResult};

/// Named limiter policies
///
/// Each mounted limiter owns its store, so budgets never bleed between
/// routes even when the same client address hits several of them.
pub mod policies {
    use super::RateLimitConfig;

    /// Generic API traffic - high ceiling
    pub fn api() -> RateLimitConfig {
        RateLimitConfig::new(300, 60)
            .with_message("Too many requests, please try again later.")
    }

    /// Contact form submission
    pub fn contact_form() -> RateLimitConfig {
        RateLimitConfig::new(5, 600)
            .with_message("Too many contact requests, please try again later.")
    }

    /// Order creation
    pub fn order_create() -> RateLimitConfig {
        RateLimitConfig::new(10, 60)
            .with_message("Too many orders submitted, please slow down.")
    }

    /// Promo code validation - discourages code guessing
    pub fn promo_validate() -> RateLimitConfig {
        RateLimitConfig::new(10, 60)
            .with_message("Too many promo code attempts, please try again later.")
    }

    /// Sensitive account operations (password change, deletion)
    pub fn account_sensitive() -> RateLimitConfig {
        RateLimitConfig::new(5, 900)
            .with_message("Too many account operations, please try again later.")
    }
}

/// Rate limiter bound to one policy and one store
pub struct RateLimiter<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    store: Arc<S>,
    config: RateLimitConfig,
}

impl<S> RateLimiter<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Count a request against `key` and report the remaining budget
    pub async fn check(&self, key: &str) -> GuardResult<RateLimitResult> {
        self.store
            .check_and_increment(key, &self.config)
            .await
            .map_err(|e| GuardError::Internal(format!("Rate limit store failed: {e}")))
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}
