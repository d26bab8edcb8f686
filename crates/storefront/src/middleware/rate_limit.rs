//! Rate limiting for the login and registration endpoints.
//!
//! Uses `governor` through `tower_governor`, keyed by the client IP as
//! reported by the reverse proxy, or by the peer address when the server is
//! reached directly. The binary serves with `ConnectInfo<SocketAddr>` so the
//! peer address is always available.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Proxy headers consulted for the client IP, in order.
const CLIENT_IP_HEADERS: [&str; 2] = ["x-forwarded-for", "x-real-ip"];

/// Key extractor that reads the client IP from proxy headers, falling back
/// to the connection's peer address.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl ClientIpKeyExtractor {
    fn from_headers(headers: &axum::http::HeaderMap) -> Option<IpAddr> {
        CLIENT_IP_HEADERS.iter().find_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        Self::from_headers(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the rate limiter for auth submissions: ~10 requests per minute per IP.
///
/// One token is replenished every 6 seconds with a burst of 5.
///
/// # Panics
///
/// Does not panic: `per_second(6)` and `burst_size(5)` are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderMap;
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    #[test]
    fn test_first_forwarded_ip_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "198.51.100.2".parse().unwrap());
        assert_eq!(
            ClientIpKeyExtractor::from_headers(&headers),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "garbage".parse().unwrap());
        headers.insert("x-real-ip", "198.51.100.2".parse().unwrap());
        assert_eq!(
            ClientIpKeyExtractor::from_headers(&headers),
            Some("198.51.100.2".parse().unwrap())
        );
    }

    #[test]
    fn test_no_headers() {
        assert!(ClientIpKeyExtractor::from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_direct_clients_are_keyed_by_peer_address() {
        let peer = |addr: &str| {
            let mut req = Request::new(());
            req.extensions_mut()
                .insert(ConnectInfo(addr.parse::<SocketAddr>().unwrap()));
            req
        };

        let first = ClientIpKeyExtractor.extract(&peer("192.0.2.10:50000")).unwrap();
        let second = ClientIpKeyExtractor.extract(&peer("192.0.2.11:50001")).unwrap();
        assert_eq!(first, "192.0.2.10".parse::<IpAddr>().unwrap());
        assert_ne!(first, second);
    }

    #[test]
    fn test_proxy_header_beats_peer_address() {
        let mut req = Request::new(());
        req.headers_mut()
            .insert("x-real-ip", "198.51.100.2".parse().unwrap());
        req.extensions_mut()
            .insert(ConnectInfo("10.0.0.5:443".parse::<SocketAddr>().unwrap()));
        assert_eq!(
            ClientIpKeyExtractor.extract(&req).unwrap(),
            "198.51.100.2".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_no_client_address_is_an_error() {
        let req = Request::new(());
        assert!(matches!(
            ClientIpKeyExtractor.extract(&req),
            Err(GovernorError::UnableToExtractKey)
        ));
    }
}
