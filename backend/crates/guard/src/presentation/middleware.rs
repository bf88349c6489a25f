//! Auth Middleware
//!
//! Bearer-token authentication and role gating. The request-per-task
//! state machine is small: `Unauthenticated -> (valid token + active
//! account) -> Authenticated`. There are no other transitions - in
//! particular no server-side logout, so a leaked token stays valid until
//! it expires.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::tokens::TokenCodec;
use crate::domain::repository::UserStore;
use crate::domain::value_object::{identity::Identity, user_role::UserRole};
use crate::error::GuardError;

/// Middleware state
pub struct AuthState<U>
where
    U: UserStore + Send + Sync + 'static,
{
    pub users: Arc<U>,
    pub codec: Arc<TokenCodec>,
}

impl<U> AuthState<U>
where
    U: UserStore + Send + Sync + 'static,
{
    pub fn new(users: Arc<U>, codec: Arc<TokenCodec>) -> Self {
        Self { users, codec }
    }
}

// Not derived: a derive would demand U: Clone, but the Arcs clone alone.
impl<U> Clone for AuthState<U>
where
    U: UserStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            codec: Arc::clone(&self.codec),
        }
    }
}

/// Typed per-request principal, attached on successful authentication
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
}

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Decode the token and confirm the account is still active
///
/// Token validity alone is not enough: the account is re-fetched so a
/// blocked or deleted user is rejected even with an unexpired token. The
/// attached identity carries the store's current values, not the claims.
async fn resolve_identity<U>(state: &AuthState<U>, headers: &HeaderMap) -> Result<Identity, GuardError>
where
    U: UserStore + Send + Sync + 'static,
{
    let token = bearer_token(headers).ok_or(GuardError::MissingToken)?;
    let token_identity = state.codec.verify_access(token).ok_or(GuardError::InvalidToken)?;

    let account = state
        .users
        .find_by_id(&token_identity.user_id)
        .await
        .map_err(|e| GuardError::UserLookupFailed(e.to_string()))?
        .ok_or(GuardError::AccountInactive)?;

    if !account.can_authenticate() {
        return Err(GuardError::AccountInactive);
    }

    Ok(account.identity())
}

/// Middleware that requires a valid bearer token and active account
pub async fn authenticate<U>(
    State(state): State<AuthState<U>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    U: UserStore + Send + Sync + 'static,
{
    match resolve_identity(&state, req.headers()).await {
        Ok(identity) => {
            req.extensions_mut().insert(AuthContext { identity });
            Ok(next.run(req).await)
        }
        Err(e) => Err(e.into_response()),
    }
}

/// Always-attached context from [`optional_authenticate`]
///
/// Present on every request that passed the optional stage, so handlers
/// extract it unconditionally and branch on the inner option.
#[derive(Debug, Clone)]
pub struct OptionalAuth {
    pub identity: Option<Identity>,
}

/// Middleware that attaches an identity when possible but never rejects
///
/// For routes that personalize behavior for logged-in users without
/// requiring login.
pub async fn optional_authenticate<U>(
    State(state): State<AuthState<U>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    U: UserStore + Send + Sync + 'static,
{
    let identity = match resolve_identity(&state, req.headers()).await {
        Ok(identity) => Some(identity),
        Err(GuardError::UserLookupFailed(msg)) => {
            tracing::warn!(message = %msg, "Optional auth degraded to anonymous: user store unavailable");
            None
        }
        Err(_) => None,
    };

    if let Some(identity) = identity.clone() {
        req.extensions_mut().insert(AuthContext { identity });
    }
    req.extensions_mut().insert(OptionalAuth { identity });

    next.run(req).await
}

/// Role gate state
#[derive(Clone)]
pub struct RoleGate {
    pub allowed: &'static [UserRole],
}

impl RoleGate {
    pub const fn allow(allowed: &'static [UserRole]) -> Self {
        Self { allowed }
    }
}

/// Middleware gating on the attached identity's role
///
/// 401 when no identity is attached (authenticate did not run or the
/// route was misconfigured), 403 when the role is outside the allow-list.
pub async fn require_role(
    State(gate): State<RoleGate>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let role = req.extensions().get::<AuthContext>().map(|ctx| ctx.identity.role);

    match role {
        None => Err(GuardError::MissingToken.into_response()),
        Some(role) if gate.allowed.contains(&role) => Ok(next.run(req).await),
        Some(role) => {
            tracing::warn!(
                role = %role,
                path = %req.uri().path(),
                "Role gate rejected request"
            );
            Err(GuardError::Forbidden.into_response())
        }
    }
}
