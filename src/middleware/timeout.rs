//! Server-side request deadline.
//!
//! Every request that reaches the handlers is bounded by
//! `REQUEST_TIMEOUT_SECS`. When the deadline passes, the handler future is
//! dropped and the client gets `408 {"error":"Request timed out"}`.
//!
//! The deadline is configured longer than the upstream timeout, so a slow
//! provider normally surfaces as the handler's own 500 first and this layer
//! only catches anything that hangs beyond that.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/games", get(handler))
//!     .layer(from_fn_with_state(RequestDeadline(Duration::from_secs(15)), enforce_deadline));
//! ```

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::AppError;
use crate::metrics;

/// Maximum time a request may spend below this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDeadline(pub Duration);

/// Middleware that aborts requests running past the deadline.
pub async fn enforce_deadline(
    State(RequestDeadline(deadline)): State<RequestDeadline>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(
                path = %path,
                deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                "Request exceeded deadline"
            );
            metrics::record_rejection("timeout");
            AppError::RequestTimeout.into_response()
        }
    }
}
