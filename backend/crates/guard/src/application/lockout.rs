//! Brute-Force Lockout Guard
//!
//! Sliding-window accounting of login attempts per (identifier, client
//! address) key. The guard gates attempts; it never verifies credentials
//! itself. Lockout ends when enough failures age out of the window, never
//! earlier - a successful login elsewhere does not reset it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::application::config::GuardConfig;
use crate::domain::entity::login_attempt::{LockoutStatus, LoginAttempt};
use crate::domain::repository::{AttemptStore, LoginAuditSink};

/// Lockout thresholds
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Failed attempts within the window that trigger lockout
    pub max_failures: u32,
    /// Sliding window duration
    pub window: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl LockoutPolicy {
    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            max_failures: config.lockout_max_failures,
            window: config.lockout_window,
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Brute-force guard service
///
/// The in-memory attempt store is the fast path; every recorded outcome
/// is also mirrored to the durable audit collaborator, fire-and-forget.
pub struct LockoutGuard<S, A>
where
    S: AttemptStore + Send + Sync + 'static,
    A: LoginAuditSink + Send + Sync + 'static,
{
    attempts: Arc<S>,
    audit: Arc<A>,
    policy: LockoutPolicy,
}

impl<S, A> LockoutGuard<S, A>
where
    S: AttemptStore + Send + Sync + 'static,
    A: LoginAuditSink + Send + Sync + 'static,
{
    pub fn new(attempts: Arc<S>, audit: Arc<A>, policy: LockoutPolicy) -> Self {
        Self {
            attempts,
            audit,
            policy,
        }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Check the lockout state for a key
    pub async fn check(&self, identifier: &str, client: &str) -> LockoutStatus {
        self.check_at(identifier, client, Utc::now().timestamp_millis())
            .await
    }

    /// Check at an explicit instant
    pub async fn check_at(&self, identifier: &str, client: &str, now_ms: i64) -> LockoutStatus {
        let window_ms = self.policy.window_ms();
        let attempts = self
            .attempts
            .window(identifier, client, now_ms - window_ms)
            .await;

        let failures: Vec<i64> = attempts
            .iter()
            .filter(|a| !a.success)
            .map(|a| a.at_ms)
            .collect();

        let max = self.policy.max_failures as usize;
        if failures.len() >= max {
            // The lockout holds until the oldest failure still counted
            // toward the threshold leaves the window.
            let pivot = failures[failures.len() - max];
            LockoutStatus::locked_until(pivot + window_ms)
        } else {
            LockoutStatus::open((max - failures.len()) as u32)
        }
    }

    /// Record a login outcome
    ///
    /// Appends to the in-memory window and forwards to the durable audit
    /// sink without awaiting it.
    pub async fn record(&self, identifier: &str, client: &str, success: bool) {
        self.record_at(identifier, client, success, Utc::now().timestamp_millis())
            .await
    }

    /// Record at an explicit instant
    pub async fn record_at(&self, identifier: &str, client: &str, success: bool, now_ms: i64) {
        let cutoff = now_ms - self.policy.window_ms();
        self.attempts
            .append(identifier, client, LoginAttempt::at(now_ms, success), cutoff)
            .await;

        let audit = Arc::clone(&self.audit);
        let identifier = identifier.to_string();
        let client = client.to_string();
        tokio::spawn(async move {
            if let Err(e) = audit.record_attempt(&identifier, &client, success).await {
                tracing::warn!(error = %e, "Failed to mirror login attempt to audit sink");
            }
        });
    }
}

/// Canonical form of a login identifier
///
/// The middleware and the login handler must agree on the key, or an
/// attacker could dodge the counter with case variations.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Human-readable lockout message ("try again in N minutes")
pub fn lockout_message(lockout_ends_at_ms: i64, now_ms: i64) -> String {
    let remaining_ms = (lockout_ends_at_ms - now_ms).max(0);
    let minutes = (remaining_ms + 59_999) / 60_000;
    let minutes = minutes.max(1);
    if minutes == 1 {
        "Too many failed login attempts. Try again in 1 minute.".to_string()
    } else {
        format!("Too many failed login attempts. Try again in {minutes} minutes.")
    }
}
