//! Presentation Layer
//!
//! Axum middleware and response DTOs.

pub mod csrf;
pub mod dto;
pub mod lockout;
pub mod middleware;
pub mod rate_limit;

pub use csrf::{CsrfState, CsrfToken, mint_csrf_token, verify_csrf_token};
pub use lockout::{LockoutState, RemainingAttempts, enforce_lockout};
pub use middleware::{
    AuthContext, AuthState, OptionalAuth, RoleGate, authenticate, optional_authenticate,
    require_role,
};
pub use rate_limit::{RateLimitState, enforce_rate_limit};
