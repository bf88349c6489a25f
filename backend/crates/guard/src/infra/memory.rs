//! In-Memory Stores
//!
//! Process-local implementations of the injectable store traits. The maps
//! are private to this module; everything else goes through the trait
//! methods. State is volatile - lost on restart - which is acceptable for
//! soft throttling but means lockout counters start from zero after a
//! redeploy even though the durable audit mirror keeps the history.
//!
//! Each operation takes its map's lock for the whole read-modify-write,
//! so concurrent requests against the same key never undercount.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateLimitStore, StoreError};

use crate::domain::entity::login_attempt::LoginAttempt;
use crate::domain::repository::{AttemptStore, LoginAuditSink};
use crate::error::GuardResult;

// ============================================================================
// Rate limit store (fixed window)
// ============================================================================

#[derive(Debug, Clone)]
struct RateEntry {
    count: u32,
    reset_at_ms: i64,
}

/// Fixed-window counter map keyed by (client address, route) strings
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    entries: Mutex<HashMap<String, RateEntry>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request at an explicit instant
    pub fn check_and_increment_at(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> RateLimitResult {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let entry = entries
            .entry(key.to_string())
            .and_modify(|e| {
                if now_ms >= e.reset_at_ms {
                    // Window elapsed - start a fresh one
                    e.count = 0;
                    e.reset_at_ms = now_ms + config.window_ms();
                }
            })
            .or_insert_with(|| RateEntry {
                count: 0,
                reset_at_ms: now_ms + config.window_ms(),
            });

        if entry.count >= config.max_requests {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_at_ms: entry.reset_at_ms,
            };
        }

        entry.count += 1;
        RateLimitResult {
            allowed: true,
            remaining: config.max_requests - entry.count,
            reset_at_ms: entry.reset_at_ms,
        }
    }

    /// Drop entries whose window elapsed before `now_ms`
    pub fn prune_expired_at(&self, now_ms: i64) -> u64 {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let before = entries.len();
        entries.retain(|_, e| e.reset_at_ms > now_ms);
        (before - entries.len()) as u64
    }

    /// Number of live keys (maintenance metrics)
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, StoreError> {
        Ok(self.check_and_increment_at(key, config, Utc::now().timestamp_millis()))
    }

    async fn prune_expired(&self) -> Result<u64, StoreError> {
        Ok(self.prune_expired_at(Utc::now().timestamp_millis()))
    }
}

// ============================================================================
// Attempt store (sliding window)
// ============================================================================

/// Ordered per-key login attempt lists
#[derive(Debug, Default)]
pub struct InMemoryAttemptStore {
    entries: Mutex<HashMap<(String, String), Vec<LoginAttempt>>>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(identifier: &str, client: &str) -> (String, String) {
        (identifier.to_string(), client.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttemptStore for InMemoryAttemptStore {
    async fn append(&self, identifier: &str, client: &str, attempt: LoginAttempt, cutoff_ms: i64) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let list = entries
            .entry(Self::key(identifier, client))
            .or_default();
        list.retain(|a| a.at_ms > cutoff_ms);
        list.push(attempt);
    }

    async fn window(&self, identifier: &str, client: &str, cutoff_ms: i64) -> Vec<LoginAttempt> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let key = Self::key(identifier, client);
        match entries.get_mut(&key) {
            Some(list) => {
                list.retain(|a| a.at_ms > cutoff_ms);
                if list.is_empty() {
                    entries.remove(&key);
                    Vec::new()
                } else {
                    list.clone()
                }
            }
            None => Vec::new(),
        }
    }

    async fn prune(&self, cutoff_ms: i64) -> u64 {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut removed = 0u64;
        entries.retain(|_, list| {
            let before = list.len();
            list.retain(|a| a.at_ms > cutoff_ms);
            removed += (before - list.len()) as u64;
            !list.is_empty()
        });
        removed
    }
}

// ============================================================================
// Audit sink
// ============================================================================

/// Log-only audit sink
///
/// Stands in where no durable audit collaborator is wired; deployments
/// replace it with their storefront persistence.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditSink;

impl LoginAuditSink for TracingAuditSink {
    async fn record_attempt(
        &self,
        identifier: &str,
        client: &str,
        success: bool,
    ) -> GuardResult<()> {
        tracing::info!(identifier, client, success, "Login attempt");
        Ok(())
    }
}
