//! Login Attempt Entity
//!
//! One entry in the sliding window the brute-force guard reasons over.

use chrono::Utc;

/// A single recorded login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginAttempt {
    /// Wall-clock timestamp in milliseconds
    pub at_ms: i64,
    pub success: bool,
}

impl LoginAttempt {
    pub fn now(success: bool) -> Self {
        Self {
            at_ms: Utc::now().timestamp_millis(),
            success,
        }
    }

    pub fn at(at_ms: i64, success: bool) -> Self {
        Self { at_ms, success }
    }
}

/// Lockout decision for an (identifier, client) key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutStatus {
    pub locked: bool,
    /// Failed attempts still available before lockout (0 when locked)
    pub remaining_attempts: u32,
    /// When the lockout naturally ends; set only while locked
    pub lockout_ends_at_ms: Option<i64>,
}

impl LockoutStatus {
    pub fn open(remaining_attempts: u32) -> Self {
        Self {
            locked: false,
            remaining_attempts,
            lockout_ends_at_ms: None,
        }
    }

    pub fn locked_until(ends_at_ms: i64) -> Self {
        Self {
            locked: true,
            remaining_attempts: 0,
            lockout_ends_at_ms: Some(ends_at_ms),
        }
    }
}
