//! HTTP middleware: the request policy pipeline plus ambient layers.
//!
//! # Pipeline
//!
//! ```text
//! Request → Request ID → Trace → Security Headers → Body Cap → Rate Limiter → Input Validation → Deadline → Handler
//!                                      │                │            │                │              │
//!                              headers on every     413 on read   429 + Retry-After  400 / 415      408
//!                                 response
//! ```
//!
//! Each policy stage either passes the request on or answers it directly;
//! a short-circuited request never reaches later stages or the handler.
//! Every rejection body is `{"error": "..."}`.
//!
//! # Security Considerations
//!
//! - The rate limiter keys on proxy headers; see [`ip`] for deployment notes
//! - Query parameter names are percent-decoded before the character check

pub mod body_limit;
pub mod input_validation;
pub mod ip;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod timeout;

pub use body_limit::{BodyLimit, limit_body};
pub use input_validation::{InputLimits, validate_input};
pub use ip::{UNKNOWN_IP, extract_client_ip};
pub use rate_limit::{ClientRateLimiter, Decision, RateLimitLayer};
pub use request_id::{REQUEST_ID_HEADER, RequestIdExt, RequestIdLayer};
pub use security_headers::{SECURITY_HEADERS, security_headers};
pub use timeout::{RequestDeadline, enforce_deadline};
