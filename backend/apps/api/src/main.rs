//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod app;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{self, Method, header};
use guard::TokenCodec;
use guard::application::lockout::{LockoutGuard, LockoutPolicy};
use guard::config::GuardConfig;
use guard::infra::{
    InMemoryAttemptStore, TracingAuditSink, spawn_attempt_sweeper, spawn_rate_limit_sweeper,
};
use platform::password::{CredentialHasher, WorkFactor};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{DemoState, Limiters, build_router};
use crate::store::SeedUserStore;

/// How often expired rate/lockout entries are swept
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,guard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration errors are fatal: exit non-zero before binding.
    let config = match GuardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Refusing to start: invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(mode = ?config.mode, "Configuration loaded");

    let work_factor = if config.mode.is_production() {
        WorkFactor::Production
    } else {
        WorkFactor::Development
    };
    let hasher = Arc::new(CredentialHasher::new(work_factor));
    let codec = Arc::new(TokenCodec::from_config(&config));

    let users = Arc::new(SeedUserStore::seed(&hasher)?);

    let attempts = Arc::new(InMemoryAttemptStore::new());
    let lockout = Arc::new(LockoutGuard::new(
        attempts.clone(),
        Arc::new(TracingAuditSink),
        LockoutPolicy::from_config(&config),
    ));

    let limiters = Limiters::new();
    for store in limiters.stores() {
        spawn_rate_limit_sweeper(store, SWEEP_INTERVAL);
    }
    spawn_attempt_sweeper(attempts.clone(), SWEEP_INTERVAL, config.lockout_window);

    // CORS configuration
    let frontend_origins = std::env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-csrf-token"),
        ]))
        .allow_credentials(true);

    // Build router
    let state = DemoState {
        users,
        codec,
        hasher,
        lockout,
    };
    let app = build_router(state, Arc::new(config), &limiters)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
