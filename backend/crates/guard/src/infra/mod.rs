//! Infrastructure Layer
//!
//! Process-local store implementations and background maintenance.

pub mod memory;
pub mod sweeper;

pub use memory::{InMemoryAttemptStore, InMemoryRateLimitStore, TracingAuditSink};
pub use sweeper::{spawn_attempt_sweeper, spawn_rate_limit_sweeper};
