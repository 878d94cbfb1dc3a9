//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (outermost first)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← X-Request-Id on request and response
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response spans
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │ Security Headers │ ← fixed headers on every response
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │    Body Cap      │ ← 413 once a read passes the cap
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │  Rate Limiting   │ ← 429 if the client's slot is taken
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │ Input Validation │ ← 400 / 415
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │    Deadline      │ ← 408 past REQUEST_TIMEOUT_SECS
//! └────────┬─────────┘
//!          ▼
//!      Handler
//! ```
//!
//! # Routes
//!
//! All routes are `GET` under `/games`; see [`handlers`](crate::handlers).
//! Unknown paths answer `404 {"error":"Not found"}`; other methods on a known
//! path answer `405 {"error":"Method not allowed"}`.

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::{Span, info, info_span};

use crate::error::AppError;
use crate::handlers;
use crate::metrics::track_requests;
use crate::middleware::{
    BodyLimit, InputLimits, RateLimitLayer, RequestDeadline, RequestIdExt, RequestIdLayer,
    enforce_deadline, limit_body, security_headers, validate_input,
};
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
///
/// Rate limiting is skipped when `RATE_LIMIT_WINDOW_MS=0`. The limiter
/// instance comes from `state`, so callers holding the state can inspect it.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    // =========================================================================
    // Routes
    // =========================================================================
    let mut router = Router::new()
        .route("/games", get(handlers::list_games))
        .route("/games/latest", get(handlers::latest_games))
        .route("/games/popular", get(handlers::popular_games))
        .route("/games/metacritic", get(handlers::metacritic_games))
        .route("/games/upcoming", get(handlers::upcoming_games))
        .route("/games/search", get(handlers::search_games))
        .route("/games/{id}", get(handlers::get_game))
        .method_not_allowed_fallback(|| async { AppError::MethodNotAllowed })
        .route_layer(from_fn(track_requests))
        .fallback(|| async { AppError::NotFound("Not found".to_string()) });

    // =========================================================================
    // Middleware (each layer wraps everything added before it)
    // =========================================================================

    router = router.layer(from_fn_with_state(
        RequestDeadline(config.request_timeout),
        enforce_deadline,
    ));

    router = router.layer(from_fn_with_state(
        InputLimits {
            max_query_length: config.max_query_length,
        },
        validate_input,
    ));

    if config.rate_limiting_enabled() {
        info!(
            window_ms = u64::try_from(config.rate_limit_window.as_millis()).unwrap_or(u64::MAX),
            idle_secs = config.rate_limit_idle_ttl.as_secs(),
            "Rate limiting enabled"
        );
        router = router.layer(RateLimitLayer::new(state.rate_limiter.clone()));
    } else {
        info!("Rate limiting disabled (RATE_LIMIT_WINDOW_MS=0)");
    }

    info!(
        max_size_mb = config.max_request_body_size / (1024 * 1024),
        "Request body size limit configured"
    );
    router = router
        .layer(from_fn_with_state(
            BodyLimit(config.max_request_body_size),
            limit_body,
        ))
        .layer(DefaultBodyLimit::disable());

    router = router.layer(from_fn(security_headers));
    router = router.layer(TraceLayer::new_for_http().make_span_with(request_span));
    router = router.layer(RequestIdLayer::new());

    router.with_state(state)
}

/// Span for one HTTP request, tagged with the ID set by [`RequestIdLayer`].
fn request_span(request: &Request) -> Span {
    info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = request.request_id().unwrap_or("-"),
    )
}
