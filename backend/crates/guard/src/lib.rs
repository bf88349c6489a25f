//! Guard - Authentication & Request-Defense Layer
//!
//! Clean Architecture structure:
//! - `domain/` - Identity/role value objects, collaborator traits
//! - `application/` - Config, token codec, lockout policy, limiter service
//! - `infra/` - In-process stores and background sweepers
//! - `presentation/` - Axum middleware and response DTOs
//!
//! ## Features
//! - Stateless JWT access/refresh tokens (HS256, shared secret)
//! - Double-submit CSRF protection (cookie + header echo, no server state)
//! - Fixed-window rate limiting keyed by client address + route
//! - Sliding-window brute-force lockout keyed by identifier + address
//! - Bearer authentication middleware with role gating
//!
//! ## Security Model
//! - Token verification fails closed: any decode error means "no identity"
//! - Authenticated requests re-check the account against the user store,
//!   so blocked/deleted accounts are rejected even with valid tokens
//! - There is no server-side logout: a token stays valid until expiry,
//!   which is an accepted property of the stateless design
//! - Rate/lockout state is process-local and volatile; it is a soft
//!   throttle, not a security boundary on its own

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{ConfigError, GuardConfig, RuntimeMode};
pub use application::lockout::LockoutGuard;
pub use application::tokens::TokenCodec;
pub use error::{GuardError, GuardResult};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::memory::*;
}

pub mod middleware {
    pub use crate::presentation::csrf::*;
    pub use crate::presentation::lockout::*;
    pub use crate::presentation::middleware::*;
    pub use crate::presentation::rate_limit::*;
}

#[cfg(test)]
mod tests;
