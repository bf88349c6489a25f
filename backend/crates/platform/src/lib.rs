//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (secure random, hex tokens)
//! - Credential hashing (Argon2id with environment-dependent work factor)
//! - Cookie management
//! - Client address and transport detection
//! - Rate limiting infrastructure

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
