//! Unit tests for the guard crate

#[cfg(test)]
mod config_tests {
    use crate::application::config::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = GuardConfig::default();

        assert_eq!(config.access_token_ttl, Duration::from_secs(86_400));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(7 * 86_400));
        assert_eq!(config.csrf_cookie_name, "csrf-token");
        assert_eq!(config.csrf_header_name, "x-csrf-token");
        assert_eq!(config.csrf_cookie_ttl, Duration::from_secs(86_400));
        assert_eq!(config.lockout_max_failures, 5);
        assert_eq!(config.lockout_window, Duration::from_secs(900));
        assert!(!config.force_secure_cookies);
        assert!(!config.debug_csrf);
    }

    #[test]
    fn test_with_random_secret() {
        let a = GuardConfig::with_random_secret();
        let b = GuardConfig::with_random_secret();

        assert_ne!(a.jwt_secret, b.jwt_secret);
        assert!(a.jwt_secret.len() >= MIN_SECRET_LEN);
    }

    #[test]
    fn test_production_requires_secret() {
        let result = GuardConfig::from_parts(RuntimeMode::Production, None, false, false);
        assert_eq!(result.unwrap_err(), ConfigError::MissingJwtSecret);
    }

    #[test]
    fn test_production_rejects_short_secret() {
        let result = GuardConfig::from_parts(
            RuntimeMode::Production,
            Some("too-short".to_string()),
            false,
            false,
        );
        assert_eq!(result.unwrap_err(), ConfigError::WeakJwtSecret { actual: 9 });
    }

    #[test]
    fn test_production_accepts_strong_secret() {
        let secret = "0123456789abcdef0123456789abcdef";
        let config = GuardConfig::from_parts(
            RuntimeMode::Production,
            Some(secret.to_string()),
            true,
            false,
        )
        .unwrap();

        assert_eq!(config.jwt_secret, secret);
        assert!(config.mode.is_production());
        assert!(config.force_secure_cookies);
    }

    #[test]
    fn test_development_generates_secret_when_missing() {
        let config =
            GuardConfig::from_parts(RuntimeMode::Development, None, false, true).unwrap();

        assert!(config.jwt_secret.len() >= MIN_SECRET_LEN);
        assert!(config.debug_csrf);
    }

    #[test]
    fn test_development_accepts_any_secret() {
        let config = GuardConfig::from_parts(
            RuntimeMode::Development,
            Some("short".to_string()),
            false,
            false,
        )
        .unwrap();
        assert_eq!(config.jwt_secret, "short");
    }
}

#[cfg(test)]
mod token_tests {
    use crate::application::tokens::{AccessClaims, TokenCodec};
    use crate::domain::{Identity, UserId, UserRole};
    use chrono::Utc;
    use std::time::Duration;

    const SECRET: &[u8] = b"unit-test-secret-0123456789abcdef";

    fn codec() -> TokenCodec {
        TokenCodec::new(
            SECRET,
            Duration::from_secs(86_400),
            Duration::from_secs(7 * 86_400),
        )
    }

    fn identity() -> Identity {
        Identity::new(UserId::new(), "shopper@example.com", UserRole::Moderator)
    }

    #[test]
    fn test_access_token_roundtrip() {
        let codec = codec();
        let identity = identity();

        let token = codec.sign_access(&identity).unwrap();
        let decoded = codec.verify_access(&token).unwrap();

        assert_eq!(decoded, identity);
    }

    #[test]
    fn test_refresh_token_roundtrip() {
        let codec = codec();
        let user_id = UserId::new();

        let token = codec.sign_refresh(&user_id).unwrap();
        assert_eq!(codec.verify_refresh(&token), Some(user_id));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let codec = codec();
        let other = TokenCodec::new(
            b"a-completely-different-secret-value",
            Duration::from_secs(86_400),
            Duration::from_secs(7 * 86_400),
        );

        let token = codec.sign_access(&identity()).unwrap();
        assert!(other.verify_access(&token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        // Issued 25 hours ago with a 24 hour TTL
        let iat = Utc::now().timestamp() - 25 * 3600;
        let token = codec.sign_access_at(&identity(), iat).unwrap();

        assert!(codec.verify_access(&token).is_none());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = codec();

        assert!(codec.verify_access("").is_none());
        assert!(codec.verify_access("not.a.jwt").is_none());
        assert!(codec.verify_access("garbage").is_none());
        assert!(codec.verify_refresh("").is_none());
        assert!(codec.verify_refresh("still garbage").is_none());
    }

    #[test]
    fn test_token_types_do_not_cross() {
        let codec = codec();
        let identity = identity();

        let access = codec.sign_access(&identity).unwrap();
        let refresh = codec.sign_refresh(&identity.user_id).unwrap();

        assert!(codec.verify_refresh(&access).is_none());
        assert!(codec.verify_access(&refresh).is_none());
    }

    #[test]
    fn test_unknown_role_fails_closed() {
        use jsonwebtoken::{EncodingKey, Header, encode};

        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: UserId::new().to_string(),
            email: "shopper@example.com".to_string(),
            role: "root".to_string(),
            typ: "access".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(codec().verify_access(&token).is_none());
    }

    #[test]
    fn test_garbage_subject_fails_closed() {
        use jsonwebtoken::{EncodingKey, Header, encode};

        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: "not-a-uuid".to_string(),
            email: "shopper@example.com".to_string(),
            role: "user".to_string(),
            typ: "access".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(codec().verify_access(&token).is_none());
    }
}

#[cfg(test)]
mod csrf_tests {
    use crate::error::GuardError;
    use crate::presentation::csrf::{check_double_submit, is_safe_method};
    use axum::http::Method;

    #[test]
    fn test_safe_methods_bypass() {
        assert!(is_safe_method(&Method::GET));
        assert!(is_safe_method(&Method::HEAD));
        assert!(is_safe_method(&Method::OPTIONS));
        assert!(!is_safe_method(&Method::POST));
        assert!(!is_safe_method(&Method::PUT));
        assert!(!is_safe_method(&Method::PATCH));
        assert!(!is_safe_method(&Method::DELETE));
    }

    #[test]
    fn test_matching_pair_passes() {
        assert!(check_double_submit(Some("abc123"), Some("abc123")).is_ok());
    }

    #[test]
    fn test_whitespace_trimmed_before_compare() {
        assert!(check_double_submit(Some("abc123"), Some("abc123  ")).is_ok());
        assert!(check_double_submit(Some("  abc123"), Some("abc123")).is_ok());
    }

    #[test]
    fn test_mismatch_rejected() {
        let result = check_double_submit(Some("abc123"), Some("abc124"));
        assert!(matches!(result, Err(GuardError::CsrfTokenMismatch)));
    }

    #[test]
    fn test_missing_cookie_rejected() {
        let result = check_double_submit(None, Some("abc123"));
        assert!(matches!(result, Err(GuardError::CsrfTokenMissing)));
    }

    #[test]
    fn test_missing_header_rejected() {
        let result = check_double_submit(Some("abc123"), None);
        assert!(matches!(result, Err(GuardError::CsrfTokenMissing)));
    }

    #[test]
    fn test_both_missing_rejected() {
        let result = check_double_submit(None, None);
        assert!(matches!(result, Err(GuardError::CsrfTokenMissing)));
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        assert!(matches!(
            check_double_submit(Some(""), Some("abc")),
            Err(GuardError::CsrfTokenMissing)
        ));
        assert!(matches!(
            check_double_submit(Some("   "), Some("   ")),
            Err(GuardError::CsrfTokenMissing)
        ));
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use crate::application::rate_limit::policies;
    use crate::infra::memory::InMemoryRateLimitStore;
    use platform::rate_limit::RateLimitConfig;

    fn config() -> RateLimitConfig {
        RateLimitConfig::new(5, 60)
    }

    #[test]
    fn test_sixth_request_in_window_rejected() {
        let store = InMemoryRateLimitStore::new();
        let config = config();
        let now = 1_000_000;

        for i in 0..5 {
            let result = store.check_and_increment_at("1.2.3.4:/api/login", &config, now + i);
            assert!(result.allowed, "request {} should pass", i + 1);
        }

        let result = store.check_and_increment_at("1.2.3.4:/api/login", &config, now + 5);
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
        // Reset is anchored to the first request of the window
        assert_eq!(result.reset_at_ms, now + 60_000);
        assert_eq!(result.retry_after_secs(now + 5), 60);
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let store = InMemoryRateLimitStore::new();
        let config = config();
        let now = 1_000_000;

        for i in 0..6 {
            store.check_and_increment_at("key", &config, now + i);
        }

        // Past the window the counter starts over at 1
        let result = store.check_and_increment_at("key", &config, now + 61_000);
        assert!(result.allowed);
        assert_eq!(result.remaining, 4);
        assert_eq!(result.reset_at_ms, now + 61_000 + 60_000);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = InMemoryRateLimitStore::new();
        let config = config();
        let now = 0;

        for _ in 0..5 {
            store.check_and_increment_at("1.2.3.4:/api/orders", &config, now);
        }
        assert!(!store.check_and_increment_at("1.2.3.4:/api/orders", &config, now).allowed);

        // Different route, same address: fresh budget
        assert!(store.check_and_increment_at("1.2.3.4:/api/promo", &config, now).allowed);
        // Different address, same route: fresh budget
        assert!(store.check_and_increment_at("5.6.7.8:/api/orders", &config, now).allowed);
    }

    #[test]
    fn test_remaining_counts_down() {
        let store = InMemoryRateLimitStore::new();
        let config = config();

        assert_eq!(store.check_and_increment_at("k", &config, 0).remaining, 4);
        assert_eq!(store.check_and_increment_at("k", &config, 0).remaining, 3);
        assert_eq!(store.check_and_increment_at("k", &config, 0).remaining, 2);
    }

    #[test]
    fn test_prune_drops_expired_windows() {
        let store = InMemoryRateLimitStore::new();
        let config = config();

        store.check_and_increment_at("old", &config, 0);
        store.check_and_increment_at("fresh", &config, 59_999);
        assert_eq!(store.len(), 2);

        let removed = store.prune_expired_at(60_001);
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_named_policies_are_tighter_than_api() {
        let api = policies::api();
        for tighter in [
            policies::contact_form(),
            policies::order_create(),
            policies::promo_validate(),
            policies::account_sensitive(),
        ] {
            assert!(tighter.max_requests < api.max_requests);
            assert!(!tighter.message.is_empty());
        }
    }
}

#[cfg(test)]
mod lockout_tests {
    use crate::application::lockout::{
        LockoutGuard, LockoutPolicy, lockout_message, normalize_identifier,
    };
    use crate::infra::memory::{InMemoryAttemptStore, TracingAuditSink};
    use std::sync::Arc;

    const WINDOW_MS: i64 = 15 * 60 * 1000;

    fn guard() -> LockoutGuard<InMemoryAttemptStore, TracingAuditSink> {
        LockoutGuard::new(
            Arc::new(InMemoryAttemptStore::new()),
            Arc::new(TracingAuditSink),
            LockoutPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_five_failures_lock_the_key() {
        let guard = guard();
        let base = 1_000_000;

        for i in 0..4 {
            guard.record_at("user@example.com", "1.2.3.4", false, base + i).await;
            let status = guard.check_at("user@example.com", "1.2.3.4", base + i).await;
            assert!(!status.locked);
        }

        guard.record_at("user@example.com", "1.2.3.4", false, base + 4).await;

        let status = guard.check_at("user@example.com", "1.2.3.4", base + 5).await;
        assert!(status.locked);
        assert_eq!(status.remaining_attempts, 0);
        // Oldest qualifying failure + window
        assert_eq!(status.lockout_ends_at_ms, Some(base + WINDOW_MS));
    }

    #[tokio::test]
    async fn test_lockout_expires_naturally() {
        let guard = guard();
        let base = 1_000_000;

        for i in 0..5 {
            guard.record_at("user@example.com", "1.2.3.4", false, base + i).await;
        }
        assert!(guard.check_at("user@example.com", "1.2.3.4", base + 10).await.locked);

        // Simulated time past lockoutEndsAt: failures fell out of the window
        let later = base + WINDOW_MS + 10;
        let status = guard.check_at("user@example.com", "1.2.3.4", later).await;
        assert!(!status.locked);
        assert_eq!(status.remaining_attempts, 5);
    }

    #[tokio::test]
    async fn test_success_does_not_clear_failures() {
        let guard = guard();
        let base = 0;

        for i in 0..4 {
            guard.record_at("user@example.com", "1.2.3.4", false, base + i).await;
        }
        guard.record_at("user@example.com", "1.2.3.4", true, base + 4).await;
        guard.record_at("user@example.com", "1.2.3.4", false, base + 5).await;

        // Five failures in the window; the interleaved success changes nothing
        let status = guard.check_at("user@example.com", "1.2.3.4", base + 6).await;
        assert!(status.locked);
    }

    #[tokio::test]
    async fn test_keys_are_scoped_to_identifier_and_client() {
        let guard = guard();

        for i in 0..5 {
            guard.record_at("user@example.com", "1.2.3.4", false, i).await;
        }

        assert!(guard.check_at("user@example.com", "1.2.3.4", 10).await.locked);
        // Same account from another address is unaffected
        assert!(!guard.check_at("user@example.com", "9.9.9.9", 10).await.locked);
        // Another account from the locked address is unaffected
        assert!(!guard.check_at("other@example.com", "1.2.3.4", 10).await.locked);
    }

    #[tokio::test]
    async fn test_remaining_attempts_count_down() {
        let guard = guard();

        assert_eq!(guard.check_at("u", "c", 0).await.remaining_attempts, 5);
        guard.record_at("u", "c", false, 1).await;
        assert_eq!(guard.check_at("u", "c", 2).await.remaining_attempts, 4);
        guard.record_at("u", "c", false, 3).await;
        assert_eq!(guard.check_at("u", "c", 4).await.remaining_attempts, 3);
    }

    #[tokio::test]
    async fn test_excess_failures_extend_the_lockout() {
        let guard = guard();

        // Seven failures: lockout pivots on the 3rd (failures[len-5])
        for i in 0..7 {
            guard.record_at("u", "c", false, i * 1_000).await;
        }

        let status = guard.check_at("u", "c", 10_000).await;
        assert!(status.locked);
        assert_eq!(status.lockout_ends_at_ms, Some(2_000 + WINDOW_MS));
    }

    #[test]
    fn test_lockout_message_wording() {
        let msg = lockout_message(15 * 60_000, 0);
        assert!(msg.contains("15 minutes"));

        let msg = lockout_message(30_000, 0);
        assert!(msg.contains("1 minute."));

        // Already past the end still names at least one minute
        let msg = lockout_message(0, 10_000);
        assert!(msg.contains("1 minute."));
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_identifier("plain"), "plain");
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::GuardError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(GuardError, StatusCode)> = vec![
            (GuardError::MissingToken, StatusCode::UNAUTHORIZED),
            (GuardError::InvalidToken, StatusCode::UNAUTHORIZED),
            (GuardError::AccountInactive, StatusCode::UNAUTHORIZED),
            (GuardError::Forbidden, StatusCode::FORBIDDEN),
            (GuardError::CsrfTokenMissing, StatusCode::FORBIDDEN),
            (GuardError::CsrfTokenMismatch, StatusCode::FORBIDDEN),
            (
                GuardError::RateLimited {
                    message: "slow down".into(),
                    retry_after_secs: 30,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                GuardError::LockedOut {
                    message: "locked".into(),
                    lockout_ends_at_ms: 1_000,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                GuardError::UserLookupFailed("db down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                GuardError::Internal("test".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(
                response.status(),
                expected_status,
                "Error should return correct status code"
            );
        }
    }

    #[test]
    fn test_machine_codes() {
        assert_eq!(GuardError::MissingToken.code(), "UNAUTHORIZED");
        assert_eq!(GuardError::InvalidToken.code(), "UNAUTHORIZED");
        assert_eq!(GuardError::AccountInactive.code(), "UNAUTHORIZED");
        assert_eq!(GuardError::Forbidden.code(), "FORBIDDEN");
        assert_eq!(GuardError::CsrfTokenMissing.code(), "CSRF_TOKEN_MISSING");
        assert_eq!(GuardError::CsrfTokenMismatch.code(), "CSRF_TOKEN_MISMATCH");
    }

    #[test]
    fn test_internal_errors_do_not_leak_details() {
        let err = GuardError::UserLookupFailed("connection refused to 10.0.0.3".into());
        let app_err = err.to_app_error();
        assert_eq!(app_err.message(), "Internal server error");
    }

    #[test]
    fn test_rate_limited_response_has_retry_after_header() {
        let response = GuardError::RateLimited {
            message: "slow down".into(),
            retry_after_secs: 42,
        }
        .into_response();

        assert_eq!(
            response.headers().get("Retry-After").and_then(|v| v.to_str().ok()),
            Some("42")
        );
    }
}

#[cfg(test)]
mod dto_tests {
    use crate::presentation::dto::{LockedOutBody, RateLimitedBody};

    #[test]
    fn test_rate_limited_body_field_names() {
        let body = RateLimitedBody {
            success: false,
            message: "Too many requests".to_string(),
            retry_after: 30,
        };
        let json = serde_json::to_string(&body).unwrap();

        assert!(json.contains(r#""success":false"#));
        assert!(json.contains(r#""retryAfter":30"#));
    }

    #[test]
    fn test_locked_out_body_field_names() {
        let body = LockedOutBody {
            success: false,
            message: "Locked".to_string(),
            lockout_ends_at: 1234567890000,
        };
        let json = serde_json::to_string(&body).unwrap();

        assert!(json.contains(r#""lockoutEndsAt":1234567890000"#));
    }
}

#[cfg(test)]
mod middleware_tests {
    use crate::presentation::middleware::bearer_token;
    use axum::http::{HeaderMap, HeaderValue, header};

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}

#[cfg(test)]
mod store_tests {
    use crate::domain::entity::login_attempt::LoginAttempt;
    use crate::domain::repository::AttemptStore;
    use crate::infra::memory::InMemoryAttemptStore;

    #[tokio::test]
    async fn test_window_prunes_old_attempts() {
        let store = InMemoryAttemptStore::new();

        store.append("u", "c", LoginAttempt::at(1_000, false), 0).await;
        store.append("u", "c", LoginAttempt::at(2_000, false), 0).await;
        store.append("u", "c", LoginAttempt::at(10_000, true), 0).await;

        let window = store.window("u", "c", 2_500).await;
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].at_ms, 10_000);
    }

    #[tokio::test]
    async fn test_empty_keys_are_dropped() {
        let store = InMemoryAttemptStore::new();

        store.append("u", "c", LoginAttempt::at(1_000, false), 0).await;
        assert_eq!(store.len(), 1);

        let window = store.window("u", "c", 5_000).await;
        assert!(window.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_prune_across_keys() {
        let store = InMemoryAttemptStore::new();

        store.append("a", "c", LoginAttempt::at(1_000, false), 0).await;
        store.append("b", "c", LoginAttempt::at(1_000, false), 0).await;
        store.append("b", "c", LoginAttempt::at(9_000, false), 0).await;

        let removed = store.prune(5_000).await;
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
    }
}
