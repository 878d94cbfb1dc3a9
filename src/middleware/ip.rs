//! Client IP extraction for the rate limiter.
//!
//! # Resolution Order
//!
//! 1. First entry of `X-Forwarded-For`
//! 2. `X-Real-IP`
//! 3. Socket peer address from axum's [`ConnectInfo`] extension
//! 4. [`UNKNOWN_IP`]
//!
//! Blank header values are skipped rather than used as a key.
//!
//! # Security Warning: IP Spoofing Risk
//!
//! **Proxy headers are client-controlled.** A client talking to this service
//! directly can rotate `X-Forwarded-For` values and get a fresh rate-limit
//! slot on every request. Deploy behind a reverse proxy that overwrites
//! (not appends to) these headers:
//!
//! ```nginx
//! proxy_set_header X-Real-IP $remote_addr;
//! proxy_set_header X-Forwarded-For $remote_addr;
//! ```
//!
//! ## The "unknown" Fallback
//!
//! Requests with no headers and no peer address share the `"unknown"` key
//! and therefore one rate-limit slot. In practice this only happens in
//! tests that drive the router without a socket.

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;

/// Fallback key when no client IP can be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// Where the client IP came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractedIp<'a> {
    /// First IP in `X-Forwarded-For`.
    FromXff(&'a str),
    /// `X-Real-IP` header.
    FromRealIp(&'a str),
    /// Socket peer address.
    FromPeer(SocketAddr),
    NotFound,
}

#[inline]
fn extract_ip<B>(req: &Request<B>) -> ExtractedIp<'_> {
    // Format: "client, proxy1, proxy2" - we want the first (client) IP
    if let Some(forwarded) = req.headers().get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first_ip) = value.split(',').next().map(str::trim)
        && !first_ip.is_empty()
    {
        return ExtractedIp::FromXff(first_ip);
    }

    if let Some(real_ip) = req.headers().get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
        && !value.trim().is_empty()
    {
        return ExtractedIp::FromRealIp(value.trim());
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return ExtractedIp::FromPeer(*addr);
    }

    ExtractedIp::NotFound
}

/// Resolve the rate-limit key for a request.
///
/// Returns `Cow::Borrowed(UNKNOWN_IP)` when nothing identifies the client.
/// The peer address is keyed by IP only, so connections from different
/// source ports share a slot.
///
/// # Example
///
/// ```ignore
/// let key = extract_client_ip(&req).into_owned(); // owned for the async block
/// ```
#[inline]
pub fn extract_client_ip<B>(req: &Request<B>) -> Cow<'static, str> {
    match extract_ip(req) {
        ExtractedIp::FromXff(ip) | ExtractedIp::FromRealIp(ip) => Cow::Owned(ip.to_string()),
        ExtractedIp::FromPeer(addr) => Cow::Owned(addr.ip().to_string()),
        ExtractedIp::NotFound => Cow::Borrowed(UNKNOWN_IP),
    }
}
