//! Fixed security headers on every response.
//!
//! | Header | Value |
//! |---|---|
//! | `X-Content-Type-Options` | `nosniff` |
//! | `X-Frame-Options` | `DENY` |
//! | `X-XSS-Protection` | `1; mode=block` |
//! | `Strict-Transport-Security` | `max-age=31536000; includeSubDomains` |
//! | `Content-Security-Policy` | `default-src 'self'` |
//!
//! This stage never short-circuits. It sits outermost in the pipeline so the
//! headers are also present on 413, 429, 400 and 415 responses.

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

/// Header name/value pairs applied to every response.
pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains",
    ),
    ("content-security-policy", "default-src 'self'"),
];

/// Middleware that stamps [`SECURITY_HEADERS`] onto the response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}
