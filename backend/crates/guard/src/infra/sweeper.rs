//! Background Sweepers
//!
//! Periodic pruning keeps the in-memory maps bounded: an abandoned key
//! would otherwise live until restart.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use platform::rate_limit::RateLimitStore;
use tokio::task::JoinHandle;

use crate::domain::repository::AttemptStore;

/// Spawn a task that periodically drops expired rate-limit windows
pub fn spawn_rate_limit_sweeper<S>(store: Arc<S>, every: Duration) -> JoinHandle<()>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick fires immediately; nothing to prune yet.
        interval.tick().await;
        loop {
            interval.tick().await;
            match store.prune_expired().await {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::debug!(removed, "Pruned expired rate-limit entries");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Rate-limit sweep failed");
                }
            }
        }
    })
}

/// Spawn a task that periodically drops login attempts older than `window`
pub fn spawn_attempt_sweeper<S>(store: Arc<S>, every: Duration, window: Duration) -> JoinHandle<()>
where
    S: AttemptStore + Send + Sync + 'static,
{
    let window_ms = window.as_millis() as i64;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let cutoff = Utc::now().timestamp_millis() - window_ms;
            let removed = store.prune(cutoff).await;
            if removed > 0 {
                tracing::debug!(removed, "Pruned stale login attempts");
            }
        }
    })
}
