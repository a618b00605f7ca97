//! Per-IP rate limiting with governor and `tower_governor`.
//!
//! - [`form_rate_limiter`]: strict, for endpoints that write to the backend
//!   on a visitor's behalf (checkout, bookings, contact, newsletter)
//! - [`api_rate_limiter`]: relaxed, for cart and search fragments

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the client IP, most trusted first.
///
/// `x-forwarded-for` may list a chain; its first entry is the client.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Key extractor reading the client IP from Cloudflare and Fly.io headers.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl ProxyIpKeyExtractor {
    fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
        CLIENT_IP_HEADERS.iter().find_map(|name| {
            headers
                .get(*name)?
                .to_str()
                .ok()?
                .split(',')
                .next()?
                .trim()
                .parse()
                .ok()
        })
    }
}

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        Self::client_ip(req.headers()).ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(replenish_secs: u64, burst: u32) -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(replenish_secs)
        .burst_size(burst)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(config)))
}

/// ~10 requests per minute per IP: one token every 6 seconds, burst of 5.
///
/// # Panics
///
/// Never in practice: `GovernorConfigBuilder` only rejects zero values.
#[must_use]
#[allow(clippy::expect_used)]
pub fn form_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5).expect("per_second(6) and burst_size(5) are non-zero")
}

/// ~100 requests per minute per IP: one token per second, burst of 50.
///
/// # Panics
///
/// Never in practice: `GovernorConfigBuilder` only rejects zero values.
#[must_use]
#[allow(clippy::expect_used)]
pub fn api_rate_limiter() -> RateLimiterLayer {
    limiter(1, 50).expect("per_second(1) and burst_size(50) are non-zero")
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_cloudflare_header_wins() {
        let map = headers(&[
            ("x-forwarded-for", "10.0.0.1"),
            ("cf-connecting-ip", "203.0.113.7"),
        ]);
        assert_eq!(
            ProxyIpKeyExtractor::client_ip(&map),
            Some("203.0.113.7".parse().unwrap_or(IpAddr::from([0, 0, 0, 0])))
        );
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let map = headers(&[("x-forwarded-for", "198.51.100.4, 10.0.0.1")]);
        assert_eq!(
            ProxyIpKeyExtractor::client_ip(&map),
            Some(IpAddr::from([198, 51, 100, 4]))
        );
    }

    #[test]
    fn test_garbage_falls_through() {
        let map = headers(&[("cf-connecting-ip", "not-an-ip"), ("fly-client-ip", "::1")]);
        assert_eq!(
            ProxyIpKeyExtractor::client_ip(&map),
            Some("::1".parse().unwrap_or(IpAddr::from([0, 0, 0, 0])))
        );
        assert_eq!(ProxyIpKeyExtractor::client_ip(&HeaderMap::new()), None);
    }
}
