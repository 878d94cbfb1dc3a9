//! Request shape checks that run before any handler.
//!
//! 1. Raw query string longer than the configured limit: 400
//! 2. `POST` without an `application/json` content type: 415
//! 3. Query parameter name containing any of `< > { } [ ] \`: 400
//!
//! Checks run in that order and the first failure ends the request.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::request_id::RequestIdExt;
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::validation::{
    validate_json_content_type, validate_query_length, validate_query_param_names,
};

/// Limits applied by [`validate_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
    pub max_query_length: usize,
}

/// Middleware that rejects malformed requests before routing.
pub async fn validate_input(
    State(limits): State<InputLimits>,
    request: Request,
    next: Next,
) -> Response {
    match check_request(&request, limits) {
        Ok(()) => next.run(request).await,
        Err((reason, err)) => {
            warn!(
                method = %request.method(),
                path = %request.uri().path(),
                request_id = request.request_id().unwrap_or("-"),
                reason,
                error = %err,
                "Rejected invalid request"
            );
            metrics::record_rejection(reason);
            err.into_response()
        }
    }
}

fn check_request(request: &Request, limits: InputLimits) -> Result<(), (&'static str, AppError)> {
    let query = request.uri().query().unwrap_or_default();

    tag(
        "query_too_long",
        validate_query_length(query, limits.max_query_length),
    )?;

    if request.method() == Method::POST {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        tag(
            "unsupported_media_type",
            validate_json_content_type(content_type),
        )?;
    }

    tag("invalid_param_name", validate_query_param_names(query))
}

fn tag(reason: &'static str, result: AppResult<()>) -> Result<(), (&'static str, AppError)> {
    result.map_err(|e| (reason, e))
}
