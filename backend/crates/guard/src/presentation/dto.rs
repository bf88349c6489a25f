//! Response DTOs
//!
//! Envelopes for the abuse-threshold rejections. Unlike credential and
//! CSRF failures (which use the standard `{success, code, message}`
//! envelope), 429 responses carry their retry hints inline.

use serde::Serialize;

/// 429 body for rate-limited requests
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitedBody {
    pub success: bool,
    pub message: String,
    /// Whole seconds until the window resets
    pub retry_after: i64,
}

/// 429 body for brute-force lockout
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedOutBody {
    pub success: bool,
    pub message: String,
    /// Unix milliseconds when the lockout naturally ends
    pub lockout_ends_at: i64,
}
