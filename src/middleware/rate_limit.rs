//! Per-client single-slot rate limiting.
//!
//! # Algorithm
//!
//! Each client key (see [`extract_client_ip`]) owns one slot: the instant of
//! its last admitted request. A new request is admitted only if at least one
//! full window has elapsed since then. There is no burst and no carry-over of
//! unused capacity, so a client gets at most one request per window.
//!
//! Rejected requests do not move the slot; the client is admitted again one
//! window after its last *admitted* request.
//!
//! # Purging
//!
//! Entries idle for longer than the idle TTL are dropped on every check, in
//! the same critical section as the admit decision. Memory for idle clients
//! is therefore reclaimed only while traffic keeps arriving.
//!
//! # Response
//!
//! On rejection (429) the body is `{"error":"Too many requests"}` with a
//! `Retry-After` header in whole seconds (at least 1).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use tower::{Layer, Service};
use tracing::warn;

use super::ip::extract_client_ip;
use super::request_id::RequestIdExt;
use crate::error::AppError;
use crate::metrics;

/// Outcome of a single rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit,
    /// Rejected; the slot frees up after this long.
    Reject { retry_after: Duration },
}

/// Process-wide map from client key to last admitted request.
///
/// Constructed once at startup and shared through [`AppState`](crate::AppState)
/// and [`RateLimitLayer`]. Tests build a fresh instance each.
#[derive(Debug)]
pub struct ClientRateLimiter {
    window: Duration,
    idle_ttl: Duration,
    slots: Mutex<HashMap<String, Instant>>,
}

impl ClientRateLimiter {
    /// Create a limiter admitting one request per `window` per client,
    /// forgetting clients idle for longer than `idle_ttl`.
    pub fn new(window: Duration, idle_ttl: Duration) -> Self {
        Self {
            window,
            idle_ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check and record a request for `key` at the current instant.
    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    /// Check and record a request for `key` at `now`.
    ///
    /// Purge and admit run under one lock, so two concurrent requests from
    /// the same client cannot both be admitted within a window.
    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        // A poisoned lock only means another request panicked mid-check;
        // the map itself is still consistent.
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let idle_ttl = self.idle_ttl;
        slots.retain(|_, last| now.saturating_duration_since(*last) <= idle_ttl);

        if let Some(last) = slots.get(key) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.window {
                return Decision::Reject {
                    retry_after: self.window.saturating_sub(elapsed),
                };
            }
        }

        slots.insert(key.to_string(), now);
        Decision::Admit
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

/// Round a wait up to whole seconds for `Retry-After`, never below 1.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

/// Rate limiting layer for the Tower middleware stack.
///
/// # Example
///
/// ```rust,ignore
/// let limiter = Arc::new(ClientRateLimiter::new(Duration::from_secs(1), Duration::from_secs(60)));
/// let app = Router::new()
///     .route("/games", get(handler))
///     .layer(RateLimitLayer::new(limiter));
/// ```
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: Arc<ClientRateLimiter>,
}

impl RateLimitLayer {
    pub fn new(limiter: Arc<ClientRateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            limiter: self.limiter.clone(),
        }
    }
}

/// Rate limiting service wrapper.
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    limiter: Arc<ClientRateLimiter>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let client_ip = extract_client_ip(&req);
        let decision = self.limiter.check(&client_ip);

        match decision {
            Decision::Admit => {
                let mut inner = self.inner.clone();
                Box::pin(async move { inner.call(req).await })
            }
            Decision::Reject { retry_after } => {
                let retry_after = retry_after_secs(retry_after);
                warn!(
                    client_ip = %client_ip,
                    path = %req.uri().path(),
                    request_id = req.request_id().unwrap_or("-"),
                    retry_after_secs = retry_after,
                    "Rate limit exceeded for IP"
                );
                metrics::record_rejection("rate_limited");

                let response = AppError::TooManyRequests {
                    retry_after_secs: retry_after,
                }
                .into_response();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(1);
    const IDLE: Duration = Duration::from_secs(60);

    fn limiter() -> ClientRateLimiter {
        ClientRateLimiter::new(WINDOW, IDLE)
    }

    #[test]
    fn test_first_request_admitted() {
        let limiter = limiter();
        assert_eq!(limiter.check_at("1.2.3.4", Instant::now()), Decision::Admit);
    }

    #[test]
    fn test_second_request_within_window_rejected() {
        let limiter = limiter();
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("1.2.3.4", t0), Decision::Admit);
        assert_eq!(
            limiter.check_at("1.2.3.4", t0 + Duration::from_millis(400)),
            Decision::Reject {
                retry_after: Duration::from_millis(600)
            }
        );
    }

    #[test]
    fn test_request_after_full_window_admitted() {
        let limiter = limiter();
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("1.2.3.4", t0), Decision::Admit);
        assert_eq!(limiter.check_at("1.2.3.4", t0 + WINDOW), Decision::Admit);
    }

    #[test]
    fn test_rejection_does_not_extend_window() {
        let limiter = limiter();
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("a", t0), Decision::Admit);
        assert!(matches!(
            limiter.check_at("a", t0 + Duration::from_millis(900)),
            Decision::Reject { .. }
        ));
        assert_eq!(
            limiter.check_at("a", t0 + Duration::from_millis(1000)),
            Decision::Admit
        );
    }

    #[test]
    fn test_no_burst_accumulation() {
        let limiter = limiter();
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("a", t0), Decision::Admit);
        // Long idle period, still below the purge threshold
        let t1 = t0 + Duration::from_secs(30);
        assert_eq!(limiter.check_at("a", t1), Decision::Admit);
        assert!(matches!(
            limiter.check_at("a", t1 + Duration::from_millis(1)),
            Decision::Reject { .. }
        ));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = limiter();
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("a", t0), Decision::Admit);
        assert_eq!(limiter.check_at("b", t0), Decision::Admit);
        assert!(matches!(limiter.check_at("a", t0), Decision::Reject { .. }));
    }

    #[test]
    fn test_idle_entries_purged() {
        let limiter = limiter();
        let t0 = Instant::now();

        limiter.check_at("idle", t0);
        limiter.check_at("active", t0);
        assert_eq!(limiter.tracked_clients(), 2);

        limiter.check_at("active", t0 + Duration::from_secs(61));
        assert_eq!(limiter.tracked_clients(), 1);
        assert_eq!(
            limiter.check_at("idle", t0 + Duration::from_secs(61)),
            Decision::Admit
        );
    }

    #[test]
    fn test_concurrent_requests_admit_exactly_one() {
        let limiter = Arc::new(limiter());
        let now = Instant::now();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.check_at("same", now))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|d| *d == Decision::Admit)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(1)), 1);
        assert_eq!(retry_after_secs(Duration::from_millis(600)), 1);
        assert_eq!(retry_after_secs(Duration::from_millis(1500)), 2);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
        assert_eq!(retry_after_secs(Duration::from_secs(3)), 3);
    }
}
