//! Token Codec
//!
//! Signs and verifies the two stateless credentials: short-lived access
//! tokens carrying the full principal and longer-lived refresh tokens
//! carrying only the subject ID. Verification is pure and fails closed;
//! a caller only ever sees `Some(identity)` or `None`.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::application::config::GuardConfig;
use crate::domain::{Identity, UserId};
use crate::error::{GuardError, GuardResult};

/// `typ` claim values: a refresh token must never pass access
/// verification, even though both are signed with the same secret.
const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Token type discriminator
    pub typ: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Refresh token claims - subject only, by design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub typ: String,
    pub iat: i64,
    pub exp: i64,
}

/// Stateless token codec (HS256, single shared secret)
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock leeway: an expired token is expired.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl_secs: access_ttl.as_secs() as i64,
            refresh_ttl_secs: refresh_ttl.as_secs() as i64,
            validation,
        }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    /// Sign an access token for the given principal
    pub fn sign_access(&self, identity: &Identity) -> GuardResult<String> {
        self.sign_access_at(identity, Utc::now().timestamp())
    }

    /// Sign a refresh token carrying only the subject ID
    pub fn sign_refresh(&self, user_id: &UserId) -> GuardResult<String> {
        self.sign_refresh_at(user_id, Utc::now().timestamp())
    }

    /// Verify an access token
    ///
    /// Returns `None` on any signature, format, type, role or expiry
    /// failure - never a partial identity, never an error.
    pub fn verify_access(&self, token: &str) -> Option<Identity> {
        let claims = decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .ok()?
            .claims;

        if claims.typ != TOKEN_TYPE_ACCESS {
            return None;
        }

        let user_id = UserId::parse_str(&claims.sub)?;
        let role = crate::domain::UserRole::from_code(&claims.role)?;

        Some(Identity::new(user_id, claims.email, role))
    }

    /// Verify a refresh token, yielding the subject ID
    pub fn verify_refresh(&self, token: &str) -> Option<UserId> {
        let claims = decode::<RefreshClaims>(token, &self.decoding, &self.validation)
            .ok()?
            .claims;

        if claims.typ != TOKEN_TYPE_REFRESH {
            return None;
        }

        UserId::parse_str(&claims.sub)
    }

    /// Sign with an explicit issue time; expiry derives from it
    pub(crate) fn sign_access_at(&self, identity: &Identity, iat: i64) -> GuardResult<String> {
        let claims = AccessClaims {
            sub: identity.user_id.to_string(),
            email: identity.email.clone(),
            role: identity.role.code().to_string(),
            typ: TOKEN_TYPE_ACCESS.to_string(),
            iat,
            exp: iat + self.access_ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| GuardError::Internal(format!("Token signing failed: {e}")))
    }

    pub(crate) fn sign_refresh_at(&self, user_id: &UserId, iat: i64) -> GuardResult<String> {
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            typ: TOKEN_TYPE_REFRESH.to_string(),
            iat,
            exp: iat + self.refresh_ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| GuardError::Internal(format!("Token signing failed: {e}")))
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish_non_exhaustive()
    }
}
