//! Rate Limiting Infrastructure
//!
//! Common rate limiting abstractions. The store is a trait so the
//! process-local map can be swapped for a shared external cache without
//! touching call sites.

use std::borrow::Cow;
use std::time::Duration;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
    /// Message returned to throttled clients
    pub message: Cow<'static, str>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
            message: Cow::Borrowed("Too many requests, please try again later."),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            ..Default::default()
        }
    }

    /// Set the client-facing rejection message
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Whole seconds until the window resets, rounded up
    ///
    /// This is the `retryAfter` hint sent with 429 responses.
    pub fn retry_after_secs(&self, now_ms: i64) -> i64 {
        let remaining_ms = (self.reset_at_ms - now_ms).max(0);
        (remaining_ms + 999) / 1000
    }
}

/// Store errors are opaque here: an external cache backend can fail in
/// ways the in-process map cannot.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Atomically count a request against `key`
    ///
    /// Creates the window on first sight of a key (or after expiry),
    /// otherwise increments. The returned result says whether the request
    /// is within the limit and how much budget is left.
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, StoreError>;

    /// Drop entries whose window has elapsed
    async fn prune_expired(&self) -> Result<u64, StoreError>;
}
