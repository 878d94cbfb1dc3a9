use url::form_urlencoded;

use crate::error::{AppError, AppResult};

// =============================================================================
// Validation Constants
// =============================================================================

/// Characters forbidden in query parameter names.
pub const FORBIDDEN_PARAM_NAME_CHARS: [char; 7] = ['<', '>', '{', '}', '[', ']', '\\'];

/// Media type required on `POST` bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Check that an upstream endpoint path is safe to append to the base URL.
///
/// Rules:
/// - Must start with `/`
/// - Only `[a-zA-Z0-9]` and `/ _ ? = & -` are allowed
///
/// Returns a description of the first violation.
pub fn check_endpoint(endpoint: &str) -> Result<(), String> {
    if !endpoint.starts_with('/') {
        return Err("endpoint must start with /".to_string());
    }

    if let Some((pos, c)) = endpoint
        .char_indices()
        .find(|&(_, c)| !is_endpoint_char(c))
    {
        return Err(format!(
            "invalid character '{}' at position {pos}",
            c.escape_debug()
        ));
    }

    Ok(())
}

fn is_endpoint_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '?' | '=' | '&' | '-')
}

/// Validate the raw query string length.
pub fn validate_query_length(query: &str, max_len: usize) -> AppResult<()> {
    if query.len() > max_len {
        return Err(AppError::BadRequest(format!(
            "Query string cannot exceed {max_len} characters"
        )));
    }
    Ok(())
}

/// Validate query parameter names.
///
/// Names are percent-decoded before the check, so `%3Cscript%3E` is rejected
/// the same as `<script>`.
pub fn validate_query_param_names(query: &str) -> AppResult<()> {
    let bad_name = form_urlencoded::parse(query.as_bytes())
        .any(|(name, _)| name.contains(FORBIDDEN_PARAM_NAME_CHARS));

    if bad_name {
        return Err(AppError::BadRequest(
            "Invalid characters in query parameter name".to_string(),
        ));
    }
    Ok(())
}

/// Validate the `Content-Type` of a request carrying a body.
///
/// Parameters such as `charset` are ignored and the media type comparison
/// is case-insensitive.
pub fn validate_json_content_type(content_type: Option<&str>) -> AppResult<()> {
    let is_json = content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE));

    if !is_json {
        return Err(AppError::UnsupportedMediaType);
    }
    Ok(())
}
