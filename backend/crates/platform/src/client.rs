//! Client identification utilities
//!
//! Common functions for resolving the client behind a request: its
//! network address (directly connected or via reverse-proxy headers) and
//! whether the request was carried over HTTPS.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract client IP address from headers
///
/// Checks `X-Forwarded-For` first (reverse proxy setups), then
/// `X-Real-IP`, then falls back to the direct connection IP.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
///
/// ## Returns
/// The client IP address, or None if not determinable
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    // X-Forwarded-For: first IP in the list is the original client
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if let Ok(ip) = real_ip.trim().parse::<IpAddr>() {
            return Some(ip);
        }
    }

    direct_ip
}

/// Resolve the client address to a stable string key
///
/// Rate-limit and lockout keys need a value even when the address cannot
/// be determined (e.g. unusual transports in tests).
pub fn client_key(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    extract_client_ip(headers, direct_ip)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Detect whether the request was transported over HTTPS
///
/// True when a trusted proxy reports `X-Forwarded-Proto: https` or
/// `X-Forwarded-SSL: on`. The TLS-terminating proxy is the only party that
/// knows; the backend itself always speaks plain HTTP.
pub fn is_secure_transport(headers: &HeaderMap) -> bool {
    if let Some(proto) = headers.get("x-forwarded-proto").and_then(|v| v.to_str().ok()) {
        if proto.split(',').any(|p| p.trim().eq_ignore_ascii_case("https")) {
            return true;
        }
    }

    headers
        .get("x-forwarded-ssl")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("on"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.9"));

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_prefers_xff_over_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("192.0.2.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.9"));

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.0.2.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let headers = HeaderMap::new();
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_client_key_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(client_key(&headers, None), "unknown");
    }

    #[test]
    fn test_is_secure_transport() {
        let mut headers = HeaderMap::new();
        assert!(!is_secure_transport(&headers));

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert!(is_secure_transport(&headers));

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("http"));
        assert!(!is_secure_transport(&headers));

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-ssl", HeaderValue::from_static("on"));
        assert!(is_secure_transport(&headers));
    }
}
