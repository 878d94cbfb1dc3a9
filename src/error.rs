use axum::http::StatusCode;
use axum::http::header::RETRY_AFTER;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::rawg_client::RawgError;

/// Public message for failed collection fetches.
pub const COLLECTION_FETCH_FAILED: &str = "Internal server error";

/// Public message for failed single-game fetches.
pub const GAME_FETCH_FAILED: &str = "Failed to fetch game";

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Upstream Errors
///
/// Failures from the RAWG client are wrapped in [`AppError::Upstream`]
/// together with the fixed message the caller is allowed to see. The
/// underlying [`RawgError`] is logged but never serialized, so provider
/// URLs, status codes and decode details stay server-side.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Unsupported media type")]
    UnsupportedMediaType,

    #[error("Too many requests")]
    TooManyRequests { retry_after_secs: u64 },

    #[error("Request timed out")]
    RequestTimeout,

    #[error("Upstream request failed: {source}")]
    Upstream {
        source: RawgError,
        public: &'static str,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Wrap an upstream failure with the message exposed to the client.
    pub fn upstream(source: RawgError, public: &'static str) -> Self {
        AppError::Upstream { source, public }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Upstream { .. } | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the `error` field of the response body.
    fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::PayloadTooLarge => "Request body too large".to_string(),
            AppError::UnsupportedMediaType => "Content-Type must be application/json".to_string(),
            AppError::TooManyRequests { .. } => "Too many requests".to_string(),
            AppError::RequestTimeout => "Request timed out".to_string(),
            AppError::Upstream { public, .. } => (*public).to_string(),
            AppError::ConfigError(_) => COLLECTION_FETCH_FAILED.to_string(),
        }
    }
}

/// Error response body for API endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Full detail stays in the logs; clients only see the public message
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = axum::Json(ErrorResponse::new(self.public_message()));

        match self {
            AppError::TooManyRequests { retry_after_secs } => (
                status,
                [(RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upstream_error_hides_detail() {
        let err = AppError::upstream(
            RawgError::UpstreamUnavailable("connection reset by 10.1.2.3".to_string()),
            GAME_FETCH_FAILED,
        );
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Failed to fetch game" }));
    }

    #[tokio::test]
    async fn test_bad_request_exposes_message() {
        let response = AppError::BadRequest("Search query is required".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Search query is required");
    }

    #[tokio::test]
    async fn test_too_many_requests_sets_retry_after() {
        let response = AppError::TooManyRequests {
            retry_after_secs: 1,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "1");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::UnsupportedMediaType.status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::NotFound("Game not found".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::RequestTimeout.status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
    }

    #[test]
    fn test_config_error_uses_generic_message() {
        let err = AppError::ConfigError("PORT: invalid digit".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[tokio::test]
    async fn test_method_not_allowed_is_json() {
        let response = AppError::MethodNotAllowed.into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Method not allowed" }));
    }
}
