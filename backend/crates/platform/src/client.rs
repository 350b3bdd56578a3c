//! Client identification utilities
//!
//! Resolves the client IP every guard keys on, and the User-Agent string.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, header};
use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Resolved client IP, stored in request extensions once per request so every
/// layer downstream keys on the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientIp(pub IpAddr);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(request_client_ip(&parts.headers, &parts.extensions)))
    }
}

/// Fallback when no address can be determined. All such requests share one
/// bucket in every limiter.
pub const UNKNOWN_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Reverse proxies in front of the server by default
pub const DEFAULT_TRUSTED_PROXY_HOPS: usize = 1;

/// Extract client IP address from headers
///
/// Every trusted proxy appends the address it accepted the connection from
/// to `X-Forwarded-For`, so the client is the entry `trusted_hops` places
/// from the right. Entries further left are client-supplied and never used.
/// With zero hops, or without the header, the direct connection IP is used.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
/// * `trusted_hops` - Number of reverse proxies in front of the server
///
/// ## Returns
/// The client IP address, or [`UNKNOWN_IP`] if not determinable
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trusted_hops: usize,
) -> IpAddr {
    if trusted_hops > 0 {
        let forwarded: Vec<&str> = headers
            .get_all(FORWARDED_FOR)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect();

        // Fewer entries than hops: the leftmost is the furthest known address
        let index = forwarded.len().saturating_sub(trusted_hops);
        if let Some(ip) = forwarded.get(index).and_then(|e| e.parse::<IpAddr>().ok()) {
            return ip;
        }
    }
    direct_ip.unwrap_or(UNKNOWN_IP)
}

/// Client IP for a request: the already resolved [`ClientIp`] extension when
/// present, otherwise resolved with [`DEFAULT_TRUSTED_PROXY_HOPS`].
pub fn request_client_ip(headers: &HeaderMap, extensions: &Extensions) -> IpAddr {
    if let Some(ClientIp(ip)) = extensions.get::<ClientIp>() {
        return *ip;
    }
    resolve_client_ip(headers, extensions, DEFAULT_TRUSTED_PROXY_HOPS)
}

/// Resolve the client IP from `X-Forwarded-For` and `ConnectInfo`, ignoring
/// any previously stored [`ClientIp`].
pub fn resolve_client_ip(
    headers: &HeaderMap,
    extensions: &Extensions,
    trusted_hops: usize,
) -> IpAddr {
    let direct = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    extract_client_ip(headers, direct, trusted_hops)
}

/// User-Agent header, or the empty string when absent or not valid UTF-8
pub fn extract_user_agent(headers: &HeaderMap) -> &str {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
