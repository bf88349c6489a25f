//! Brute-Force Lockout Middleware
//!
//! Gates the login route before credential verification runs. The
//! identifier lives in the JSON request body, so the middleware buffers
//! the body, probes the identifier field, and replays the bytes to the
//! handler unchanged.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use kernel::error::app_error::AppError;
use platform::client::client_key;

use crate::application::lockout::{LockoutGuard, lockout_message, normalize_identifier};
use crate::domain::repository::{AttemptStore, LoginAuditSink};
use crate::error::GuardError;

/// Login bodies are small; anything larger is not a login request
const MAX_PROBE_BODY_BYTES: usize = 64 * 1024;

/// Middleware state
pub struct LockoutState<S, A>
where
    S: AttemptStore + Send + Sync + 'static,
    A: LoginAuditSink + Send + Sync + 'static,
{
    pub guard: Arc<LockoutGuard<S, A>>,
    /// JSON field holding the login identifier
    pub identifier_field: &'static str,
}

impl<S, A> LockoutState<S, A>
where
    S: AttemptStore + Send + Sync + 'static,
    A: LoginAuditSink + Send + Sync + 'static,
{
    pub fn new(guard: Arc<LockoutGuard<S, A>>) -> Self {
        Self {
            guard,
            identifier_field: "email",
        }
    }
}

// Not derived: a derive would demand S: Clone and A: Clone.
impl<S, A> Clone for LockoutState<S, A>
where
    S: AttemptStore + Send + Sync + 'static,
    A: LoginAuditSink + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            guard: Arc::clone(&self.guard),
            identifier_field: self.identifier_field,
        }
    }
}

/// Failed-attempt budget left for this key, attached for the handler
#[derive(Debug, Clone, Copy)]
pub struct RemainingAttempts(pub u32);

/// Middleware rejecting locked (identifier, client) keys with 429
///
/// A body that is not JSON or lacks the identifier field passes the gate
/// un-keyed; the handler's own validation deals with it.
pub async fn enforce_lockout<S, A>(
    State(state): State<LockoutState<S, A>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    S: AttemptStore + Send + Sync + 'static,
    A: LoginAuditSink + Send + Sync + 'static,
{
    let direct_ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip());
    let client = client_key(req.headers(), direct_ip);

    let (parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_PROBE_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return Err(AppError::bad_request("Request body too large").into_response());
        }
    };

    let identifier = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|v| {
            v.get(state.identifier_field)
                .and_then(|f| f.as_str())
                .map(normalize_identifier)
        });

    let mut req = Request::from_parts(parts, Body::from(bytes));

    if let Some(identifier) = identifier {
        let now_ms = Utc::now().timestamp_millis();
        let status = state.guard.check_at(&identifier, &client, now_ms).await;

        if status.locked {
            let ends_at = status.lockout_ends_at_ms.unwrap_or(now_ms);
            return Err(GuardError::LockedOut {
                message: lockout_message(ends_at, now_ms),
                lockout_ends_at_ms: ends_at,
            }
            .into_response());
        }

        req.extensions_mut().insert(RemainingAttempts(status.remaining_attempts));
    }

    Ok(next.run(req).await)
}
