//! Rate Limiter Middleware
//!
//! Fixed-window throttling keyed by (client address, route path). Each
//! mounted limiter carries its own policy and store; rejected requests
//! get a retry hint, allowed ones get informational budget headers.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use platform::client::client_key;
use platform::rate_limit::RateLimitStore;

use crate::application::rate_limit::RateLimiter;
use crate::error::GuardError;

/// Middleware state
pub struct RateLimitState<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    pub limiter: Arc<RateLimiter<S>>,
}

impl<S> RateLimitState<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    pub fn new(limiter: Arc<RateLimiter<S>>) -> Self {
        Self { limiter }
    }
}

// Not derived: a derive would demand S: Clone, but the Arc clones alone.
impl<S> Clone for RateLimitState<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
        }
    }
}

/// Middleware enforcing the mounted limiter
pub async fn enforce_rate_limit<S>(
    State(state): State<RateLimitState<S>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    let direct_ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip());

    let client = client_key(req.headers(), direct_ip);
    let key = format!("{}:{}", client, req.uri().path());

    let result = match state.limiter.check(&key).await {
        Ok(result) => result,
        Err(e) => return Err(e.into_response()),
    };

    let config = state.limiter.config();

    if !result.allowed {
        let now_ms = Utc::now().timestamp_millis();
        return Err(GuardError::RateLimited {
            message: config.message.to_string(),
            retry_after_secs: result.retry_after_secs(now_ms),
        }
        .into_response());
    }

    let limit = config.max_requests;
    let remaining = result.remaining;
    let reset_secs = result.reset_at_ms / 1000;

    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    if let Ok(v) = limit.to_string().parse() {
        headers.insert("x-ratelimit-limit", v);
    }
    if let Ok(v) = remaining.to_string().parse() {
        headers.insert("x-ratelimit-remaining", v);
    }
    if let Ok(v) = reset_secs.to_string().parse() {
        headers.insert("x-ratelimit-reset", v);
    }

    Ok(response)
}
