//! Request body size cap.
//!
//! The body is wrapped in [`http_body_util::Limited`], so nothing happens up
//! front: the request only fails once something reads past the cap. Axum's
//! body extractors recognise the resulting `LengthLimitError` and answer
//! `413 Payload Too Large` in plain text; that answer is replaced with the
//! JSON [`AppError::PayloadTooLarge`] body on the way out.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http_body_util::Limited;
use tracing::warn;

use crate::error::AppError;
use crate::metrics::record_rejection;

/// Maximum number of body bytes a handler may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimit(pub usize);

/// Middleware that caps the readable request body at [`BodyLimit`] bytes.
pub async fn limit_body(
    State(BodyLimit(limit)): State<BodyLimit>,
    request: Request,
    next: Next,
) -> Response {
    let request = request.map(|body| Body::new(Limited::new(body, limit)));
    let response = next.run(request).await;

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(limit, "Request body exceeded limit");
        record_rejection("payload_too_large");
        return AppError::PayloadTooLarge.into_response();
    }

    response
}
