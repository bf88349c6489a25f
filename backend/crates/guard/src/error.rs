//! Guard Error Types
//!
//! This module provides defense-layer error variants that integrate
//! with the unified `kernel::error::AppError` system. Credential and
//! CSRF failures become structured 4xx envelopes with stable machine
//! codes; abuse-threshold rejections (429) carry their retry hints in
//! the body instead of a `code` field.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use thiserror::Error;

use crate::presentation::dto::{LockedOutBody, RateLimitedBody};

/// Guard-specific result type alias
pub type GuardResult<T> = Result<T, GuardError>;

/// Guard-specific error variants
#[derive(Debug, Error)]
pub enum GuardError {
    /// No bearer token on a protected route
    #[error("Authentication required")]
    MissingToken,

    /// Token failed signature/format/expiry verification
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Token was valid but the account is gone or blocked
    #[error("Account is not active")]
    AccountInactive,

    /// Role not in the allow-list
    #[error("Insufficient permissions")]
    Forbidden,

    /// CSRF cookie or header absent on a state-changing request
    #[error("CSRF token missing")]
    CsrfTokenMissing,

    /// CSRF cookie and header differ
    #[error("CSRF token mismatch")]
    CsrfTokenMismatch,

    /// Fixed-window rate limit exceeded
    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_secs: i64,
    },

    /// Brute-force lockout is active
    #[error("{message}")]
    LockedOut {
        message: String,
        lockout_ends_at_ms: i64,
    },

    /// The user-lookup collaborator failed; no safe decision possible
    #[error("User lookup failed: {0}")]
    UserLookupFailed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GuardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GuardError::MissingToken
            | GuardError::InvalidToken
            | GuardError::AccountInactive => StatusCode::UNAUTHORIZED,
            GuardError::Forbidden
            | GuardError::CsrfTokenMissing
            | GuardError::CsrfTokenMismatch => StatusCode::FORBIDDEN,
            GuardError::RateLimited { .. } | GuardError::LockedOut { .. } => {
                StatusCode::TOO_MANY_REQUESTS
            }
            GuardError::UserLookupFailed(_) | GuardError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code for the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            GuardError::MissingToken
            | GuardError::InvalidToken
            | GuardError::AccountInactive => "UNAUTHORIZED",
            GuardError::Forbidden => "FORBIDDEN",
            GuardError::CsrfTokenMissing => "CSRF_TOKEN_MISSING",
            GuardError::CsrfTokenMismatch => "CSRF_TOKEN_MISMATCH",
            GuardError::RateLimited { .. } => "TOO_MANY_REQUESTS",
            GuardError::LockedOut { .. } => "TOO_MANY_REQUESTS",
            GuardError::UserLookupFailed(_) | GuardError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to AppError (standard envelope variants only)
    pub fn to_app_error(&self) -> AppError {
        let message: String = match self {
            // Client-facing messages never carry internals
            GuardError::UserLookupFailed(_) | GuardError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        AppError::new(self.kind(), message).with_code(self.code())
    }

    fn kind(&self) -> kernel::error::kind::ErrorKind {
        use kernel::error::kind::ErrorKind;
        match self.status_code() {
            StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
            StatusCode::FORBIDDEN => ErrorKind::Forbidden,
            StatusCode::TOO_MANY_REQUESTS => ErrorKind::TooManyRequests,
            _ => ErrorKind::InternalServerError,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            GuardError::UserLookupFailed(msg) => {
                tracing::error!(message = %msg, "User store lookup failed");
            }
            GuardError::Internal(msg) => {
                tracing::error!(message = %msg, "Guard internal error");
            }
            GuardError::CsrfTokenMissing | GuardError::CsrfTokenMismatch => {
                tracing::warn!(error = %self, "CSRF check rejected request");
            }
            GuardError::AccountInactive => {
                tracing::warn!("Valid token presented for inactive account");
            }
            GuardError::RateLimited { .. } | GuardError::LockedOut { .. } => {
                // Abuse thresholds are operational noise, not app errors
                tracing::debug!(error = %self, "Request throttled");
            }
            _ => {
                tracing::debug!(error = %self, "Guard rejection");
            }
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        self.log();
        match self {
            GuardError::RateLimited {
                message,
                retry_after_secs,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_after_secs.to_string())],
                Json(RateLimitedBody {
                    success: false,
                    message,
                    retry_after: retry_after_secs,
                }),
            )
                .into_response(),
            GuardError::LockedOut {
                message,
                lockout_ends_at_ms,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(LockedOutBody {
                    success: false,
                    message,
                    lockout_ends_at: lockout_ends_at_ms,
                }),
            )
                .into_response(),
            other => other.to_app_error().into_response(),
        }
    }
}
