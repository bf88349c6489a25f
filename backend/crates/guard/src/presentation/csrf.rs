//! CSRF Guard Middleware
//!
//! Stateless double-submit protection. The mint stage hands every browser
//! a random token via a script-readable cookie; the check stage requires
//! state-changing requests to echo it in a custom header. Nothing is kept
//! server-side: validity means "header equals cookie". A cross-origin
//! attacker can make the browser send the cookie but cannot read it, so
//! it cannot forge the matching header.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use platform::client::is_secure_transport;
use platform::cookie::{CookieConfig, SameSite, extract_cookie, set_cookie_header};
use platform::crypto::random_hex;

use crate::application::config::GuardConfig;
use crate::error::GuardError;

/// Entropy of a minted token (hex-encoded, so 64 chars on the wire)
pub const CSRF_TOKEN_BYTES: usize = 32;

/// Middleware state
#[derive(Clone)]
pub struct CsrfState {
    pub config: Arc<GuardConfig>,
}

impl CsrfState {
    pub fn new(config: Arc<GuardConfig>) -> Self {
        Self { config }
    }
}

/// Per-request slot exposing the current token to the rendering layer
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

/// Read-only verbs bypass the check stage entirely
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// The double-submit decision
///
/// Values are compared after trimming ASCII whitespace; a missing or
/// empty cookie/header is a hard rejection, never "no protection needed".
pub fn check_double_submit(cookie: Option<&str>, header: Option<&str>) -> Result<(), GuardError> {
    let cookie = cookie.map(str::trim).filter(|s| !s.is_empty());
    let header = header.map(str::trim).filter(|s| !s.is_empty());

    match (cookie, header) {
        (Some(c), Some(h)) if c == h => Ok(()),
        (Some(_), Some(_)) => Err(GuardError::CsrfTokenMismatch),
        _ => Err(GuardError::CsrfTokenMissing),
    }
}

/// Mint stage - runs on every request, safe or not
///
/// Reuses the browser's existing token when present; the cookie is always
/// (re-)set so its 24-hour expiry slides forward.
pub async fn mint_csrf_token(
    State(state): State<CsrfState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let config = &state.config;

    let token = extract_cookie(req.headers(), &config.csrf_cookie_name)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| random_hex(CSRF_TOKEN_BYTES));

    let secure = config.force_secure_cookies || is_secure_transport(req.headers());

    req.extensions_mut().insert(CsrfToken(token.clone()));

    let mut response = next.run(req).await;

    let cookie = CookieConfig {
        name: config.csrf_cookie_name.clone(),
        secure,
        // Client script must read the token back to echo it
        http_only: false,
        same_site: if secure { SameSite::Strict } else { SameSite::Lax },
        path: "/".to_string(),
        max_age_secs: Some(config.csrf_cookie_ttl_secs()),
    };

    response
        .headers_mut()
        .append(header::SET_COOKIE, set_cookie_header(&cookie, &token));

    response
}

/// Check stage - non-safe methods only
pub async fn verify_csrf_token(
    State(state): State<CsrfState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let config = &state.config;

    if is_safe_method(req.method()) {
        return Ok(next.run(req).await);
    }

    let cookie = extract_cookie(req.headers(), &config.csrf_cookie_name);
    let header = req
        .headers()
        .get(config.csrf_header_name.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let outcome = check_double_submit(cookie.as_deref(), header.as_deref());

    if config.debug_csrf {
        tracing::debug!(
            method = %req.method(),
            path = %req.uri().path(),
            has_cookie = cookie.is_some(),
            has_header = header.is_some(),
            passed = outcome.is_ok(),
            "CSRF double-submit check"
        );
    }

    match outcome {
        Ok(()) => Ok(next.run(req).await),
        Err(e) => Err(e.into_response()),
    }
}
