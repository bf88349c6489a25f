//! Demo Application Wiring
//!
//! Shows how the guard layers compose over a storefront-shaped API. The
//! handlers are stubs; the interesting part is the middleware stack:
//! CSRF mint outermost, the generic API limiter, the CSRF check, then
//! per-route limiters, the login lockout gate, and bearer auth with role
//! gating on the admin surface.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{ConnectInfo, Extension, Json, State};
use axum::http::HeaderMap;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::json;

use guard::application::lockout::normalize_identifier;
use guard::application::rate_limit::{RateLimiter, policies};
use guard::config::GuardConfig;
use guard::domain::{Identity, UserRole, UserStore};
use guard::middleware::{
    AuthContext, AuthState, CsrfState, CsrfToken, LockoutState, OptionalAuth, RateLimitState,
    RoleGate, authenticate, enforce_lockout, enforce_rate_limit, mint_csrf_token,
    optional_authenticate, require_role, verify_csrf_token,
};
use guard::store::{InMemoryAttemptStore, InMemoryRateLimitStore, TracingAuditSink};
use guard::{AppError, AppResult, LockoutGuard, TokenCodec};
use platform::client::client_key;
use platform::password::CredentialHasher;
use platform::rate_limit::RateLimitConfig;

use crate::store::SeedUserStore;

type Lockout = LockoutGuard<InMemoryAttemptStore, TracingAuditSink>;

const ADMIN_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::SuperAdmin];

/// Handler state
#[derive(Clone)]
pub struct DemoState {
    pub users: Arc<SeedUserStore>,
    pub codec: Arc<TokenCodec>,
    pub hasher: Arc<CredentialHasher>,
    pub lockout: Arc<Lockout>,
}

/// One store per mounted limiter, so budgets stay independent
pub struct Limiters {
    pub api: Arc<InMemoryRateLimitStore>,
    pub contact: Arc<InMemoryRateLimitStore>,
    pub orders: Arc<InMemoryRateLimitStore>,
    pub promo: Arc<InMemoryRateLimitStore>,
    pub account: Arc<InMemoryRateLimitStore>,
}

impl Limiters {
    pub fn new() -> Self {
        Self {
            api: Arc::new(InMemoryRateLimitStore::new()),
            contact: Arc::new(InMemoryRateLimitStore::new()),
            orders: Arc::new(InMemoryRateLimitStore::new()),
            promo: Arc::new(InMemoryRateLimitStore::new()),
            account: Arc::new(InMemoryRateLimitStore::new()),
        }
    }

    /// All stores, for sweeper registration
    pub fn stores(&self) -> Vec<Arc<InMemoryRateLimitStore>> {
        vec![
            self.api.clone(),
            self.contact.clone(),
            self.orders.clone(),
            self.promo.clone(),
            self.account.clone(),
        ]
    }
}

impl Default for Limiters {
    fn default() -> Self {
        Self::new()
    }
}

fn rl_state(
    store: &Arc<InMemoryRateLimitStore>,
    config: RateLimitConfig,
) -> RateLimitState<InMemoryRateLimitStore> {
    RateLimitState::new(Arc::new(RateLimiter::new(Arc::clone(store), config)))
}

/// Assemble the full router
pub fn build_router(state: DemoState, config: Arc<GuardConfig>, limiters: &Limiters) -> Router {
    let csrf_state = CsrfState::new(config);
    let auth_state = AuthState::new(state.users.clone(), state.codec.clone());
    let lockout_state = LockoutState::new(state.lockout.clone());

    let login_routes = Router::new().route("/auth/login", post(login)).layer(
        from_fn_with_state(
            lockout_state,
            enforce_lockout::<InMemoryAttemptStore, TracingAuditSink>,
        ),
    );

    let public_routes = Router::new()
        .route("/auth/refresh", post(refresh))
        .route("/csrf", get(csrf_token));

    let personalized_routes = Router::new().route("/catalog", get(catalog)).layer(
        from_fn_with_state(auth_state.clone(), optional_authenticate::<SeedUserStore>),
    );

    let contact_routes = Router::new().route("/contact", post(contact)).layer(
        from_fn_with_state(
            rl_state(&limiters.contact, policies::contact_form()),
            enforce_rate_limit::<InMemoryRateLimitStore>,
        ),
    );

    let promo_routes = Router::new()
        .route("/promo/validate", post(promo_validate))
        .layer(from_fn_with_state(
            rl_state(&limiters.promo, policies::promo_validate()),
            enforce_rate_limit::<InMemoryRateLimitStore>,
        ));

    let orders_routes = Router::new().route("/orders", post(create_order)).layer(
        from_fn_with_state(
            rl_state(&limiters.orders, policies::order_create()),
            enforce_rate_limit::<InMemoryRateLimitStore>,
        ),
    );

    let account_routes = Router::new()
        .route("/account/password", post(change_password))
        .layer(from_fn_with_state(
            rl_state(&limiters.account, policies::account_sensitive()),
            enforce_rate_limit::<InMemoryRateLimitStore>,
        ));

    let protected_routes = Router::new()
        .route("/me", get(me))
        .merge(orders_routes)
        .merge(account_routes)
        .layer(from_fn_with_state(
            auth_state.clone(),
            authenticate::<SeedUserStore>,
        ));

    let admin_routes = Router::new()
        .route("/admin/stats", get(admin_stats))
        .layer(from_fn_with_state(RoleGate::allow(ADMIN_ROLES), require_role))
        .layer(from_fn_with_state(auth_state, authenticate::<SeedUserStore>));

    let api = Router::new()
        .merge(login_routes)
        .merge(public_routes)
        .merge(personalized_routes)
        .merge(contact_routes)
        .merge(promo_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(state);

    // Request flow: CSRF mint -> generic limiter -> CSRF check -> routes
    Router::new()
        .nest("/api", api)
        .layer(from_fn_with_state(csrf_state.clone(), verify_csrf_token))
        .layer(from_fn_with_state(
            rl_state(&limiters.api, policies::api()),
            enforce_rate_limit::<InMemoryRateLimitStore>,
        ))
        .layer(from_fn_with_state(csrf_state, mint_csrf_token))
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    success: bool,
    access_token: String,
    refresh_token: String,
    user: Identity,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    success: bool,
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactRequest {
    email: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromoRequest {
    code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRequest {
    items: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChangeRequest {
    current_password: String,
    new_password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
///
/// The lockout middleware has already rejected locked keys; this handler
/// does the actual credential check and records the outcome either way.
async fn login(
    State(state): State<DemoState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let client = client_key(&headers, Some(addr.ip()));
    let identifier = normalize_identifier(&req.email);

    let Some((account, digest)) = state.users.credentials_by_email(&identifier) else {
        state.lockout.record(&identifier, &client, false).await;
        return Err(AppError::unauthorized("Invalid email or password"));
    };

    if !account.can_authenticate() || !state.hasher.verify(&req.password, &digest) {
        state.lockout.record(&identifier, &client, false).await;
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    state.lockout.record(&identifier, &client, true).await;

    let identity = account.identity();
    let access_token = state
        .codec
        .sign_access(&identity)
        .map_err(|e| e.to_app_error())?;
    let refresh_token = state
        .codec
        .sign_refresh(&identity.user_id)
        .map_err(|e| e.to_app_error())?;

    tracing::info!(user = %identity.user_id, "Login succeeded");

    Ok(Json(LoginResponse {
        success: true,
        access_token,
        refresh_token,
        user: identity,
    }))
}

/// POST /api/auth/refresh
///
/// Exchanges a refresh token for a fresh access token, re-checking that
/// the account still exists and is not blocked.
async fn refresh(
    State(state): State<DemoState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let user_id = state
        .codec
        .verify_refresh(&req.refresh_token)
        .ok_or_else(|| AppError::unauthorized("Invalid or expired refresh token"))?;

    let account = state
        .users
        .find_by_id(&user_id)
        .await
        .map_err(|e| e.to_app_error())?
        .filter(|a| a.can_authenticate())
        .ok_or_else(|| AppError::unauthorized("Account is not active"))?;

    let access_token = state
        .codec
        .sign_access(&account.identity())
        .map_err(|e| e.to_app_error())?;

    Ok(Json(RefreshResponse {
        success: true,
        access_token,
    }))
}

/// GET /api/csrf - expose the minted token to SPA clients
async fn csrf_token(Extension(token): Extension<CsrfToken>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "csrfToken": token.0 }))
}

/// GET /api/catalog - personalized when a valid token is presented
async fn catalog(Extension(auth): Extension<OptionalAuth>) -> Json<serde_json::Value> {
    let recommended_for = auth.identity.map(|identity| identity.email);
    Json(json!({
        "success": true,
        "items": ["espresso beans", "pour-over kettle", "ceramic dripper"],
        "recommendedFor": recommended_for,
    }))
}

/// GET /api/me
async fn me(Extension(ctx): Extension<AuthContext>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "user": ctx.identity }))
}

/// GET /api/admin/stats
async fn admin_stats(Extension(ctx): Extension<AuthContext>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "requestedBy": ctx.identity.email,
        "ordersToday": 0,
        "openTickets": 0,
    }))
}

/// POST /api/contact
async fn contact(Json(req): Json<ContactRequest>) -> Json<serde_json::Value> {
    tracing::info!(email = %req.email, chars = req.message.len(), "Contact form received");
    Json(json!({ "success": true, "message": "Thanks, we will be in touch." }))
}

/// POST /api/promo/validate
async fn promo_validate(Json(req): Json<PromoRequest>) -> Json<serde_json::Value> {
    let valid = req.code.eq_ignore_ascii_case("WELCOME10");
    Json(json!({ "success": true, "valid": valid }))
}

/// POST /api/orders
async fn create_order(
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<OrderRequest>,
) -> Json<serde_json::Value> {
    tracing::info!(user = %ctx.identity.user_id, items = req.items.len(), "Order received");
    Json(json!({ "success": true, "itemCount": req.items.len() }))
}

/// POST /api/account/password
async fn change_password(
    State(state): State<DemoState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<PasswordChangeRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let Some((_, digest)) = state.users.credentials_by_email(&ctx.identity.email) else {
        return Err(AppError::unauthorized("Account is not active"));
    };

    if !state.hasher.verify(&req.current_password, &digest) {
        return Err(AppError::unauthorized("Current password is incorrect"));
    }

    // The seeded demo store is read-only; a real deployment persists this.
    let _new_digest = state
        .hasher
        .hash(&req.new_password)
        .map_err(|e| AppError::internal("Password hashing failed").with_source(e))?;

    Ok(Json(json!({ "success": true, "message": "Password updated." })))
}
