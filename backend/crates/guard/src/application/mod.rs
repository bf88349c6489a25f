//! Application Layer
//!
//! Configuration and the services the middleware composes.

pub mod config;
pub mod lockout;
pub mod rate_limit;
pub mod tokens;

// Re-exports
pub use config::{ConfigError, GuardConfig, RuntimeMode};
pub use lockout::{LockoutGuard, LockoutPolicy};
pub use rate_limit::{RateLimiter, policies};
pub use tokens::TokenCodec;
