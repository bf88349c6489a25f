//! Application Configuration
//!
//! Configuration for the guard layer, materialized from the environment
//! at startup. The signing-secret policy is deliberately strict: a
//! production process without a real secret must never come up.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Minimum accepted secret length in production (characters)
pub const MIN_SECRET_LEN: usize = 32;

/// Runtime mode, selected by `NODE_ENV`
///
/// Anything other than `production` counts as development; an unset
/// variable on a production box failing open would be worse than the
/// strict reading failing closed via the secret policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    Production,
    #[default]
    Development,
}

impl RuntimeMode {
    pub fn from_env() -> Self {
        match env::var("NODE_ENV") {
            Ok(v) if v.eq_ignore_ascii_case("production") => RuntimeMode::Production,
            _ => RuntimeMode::Development,
        }
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, RuntimeMode::Production)
    }
}

/// Fatal configuration errors
///
/// Any of these must abort startup before a listener binds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is required in production and is not set")]
    MissingJwtSecret,

    #[error("JWT_SECRET is too short for production: {actual} chars (need at least {min})", min = MIN_SECRET_LEN)]
    WeakJwtSecret { actual: usize },
}

/// Guard layer configuration
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Runtime mode
    pub mode: RuntimeMode,
    /// Shared HS256 signing secret
    pub jwt_secret: String,
    /// Access token lifetime (1 day)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (7 days)
    pub refresh_token_ttl: Duration,
    /// CSRF cookie name
    pub csrf_cookie_name: String,
    /// CSRF echo header name
    pub csrf_header_name: String,
    /// CSRF cookie sliding expiry (24 hours)
    pub csrf_cookie_ttl: Duration,
    /// Force the Secure cookie attribute regardless of detected transport
    pub force_secure_cookies: bool,
    /// Verbose CSRF decision logging
    pub debug_csrf: bool,
    /// Failed logins within the window before lockout
    pub lockout_max_failures: u32,
    /// Brute-force sliding window (15 minutes)
    pub lockout_window: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::Development,
            jwt_secret: String::new(),
            access_token_ttl: Duration::from_secs(24 * 3600),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600),
            csrf_cookie_name: "csrf-token".to_string(),
            csrf_header_name: "x-csrf-token".to_string(),
            csrf_cookie_ttl: Duration::from_secs(24 * 3600),
            force_secure_cookies: false,
            debug_csrf: false,
            lockout_max_failures: 5,
            lockout_window: Duration::from_secs(15 * 60),
        }
    }
}

impl GuardConfig {
    /// Create config with a random signing secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            jwt_secret: platform::crypto::random_hex(32),
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Load configuration from the environment
    ///
    /// Reads `NODE_ENV`, `JWT_SECRET`, `FORCE_SECURE_COOKIES` and
    /// `DEBUG_CSRF`. Errors are fatal startup conditions.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = RuntimeMode::from_env();
        let secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());

        Self::from_parts(
            mode,
            secret,
            env_flag("FORCE_SECURE_COOKIES"),
            env_flag("DEBUG_CSRF"),
        )
    }

    /// Assemble a config from already-resolved inputs
    ///
    /// Split from [`from_env`] so the secret policy is testable without
    /// touching process environment.
    pub fn from_parts(
        mode: RuntimeMode,
        jwt_secret: Option<String>,
        force_secure_cookies: bool,
        debug_csrf: bool,
    ) -> Result<Self, ConfigError> {
        let jwt_secret = match (mode, jwt_secret) {
            (RuntimeMode::Production, None) => return Err(ConfigError::MissingJwtSecret),
            (RuntimeMode::Production, Some(s)) => {
                let actual = s.chars().count();
                if actual < MIN_SECRET_LEN {
                    return Err(ConfigError::WeakJwtSecret { actual });
                }
                s
            }
            (RuntimeMode::Development, Some(s)) => s,
            (RuntimeMode::Development, None) => {
                tracing::warn!(
                    "JWT_SECRET is not set; using a random per-process secret. \
                     Issued tokens will not survive a restart."
                );
                platform::crypto::random_hex(32)
            }
        };

        Ok(Self {
            mode,
            jwt_secret,
            force_secure_cookies,
            debug_csrf,
            ..Default::default()
        })
    }

    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_ttl.as_secs() as i64
    }

    pub fn refresh_token_ttl_secs(&self) -> i64 {
        self.refresh_token_ttl.as_secs() as i64
    }

    pub fn csrf_cookie_ttl_secs(&self) -> i64 {
        self.csrf_cookie_ttl.as_secs() as i64
    }

    pub fn lockout_window_ms(&self) -> i64 {
        self.lockout_window.as_millis() as i64
    }
}

/// Truthy environment flag: "1", "true", "yes" (case-insensitive)
fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| {
            let v = v.trim();
            v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
        })
        .unwrap_or(false)
}
