use axum::http::StatusCode;
use axum::http::header::RETRY_AFTER;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Failure Semantics
///
/// Credential failures are deliberately coarse: an expired session, a forged
/// signature, and a malformed token all surface as the same `Unauthorized`
/// (or `Forbidden` for action-token and CSRF failures) with a generic
/// message. The distinction is logged server-side but never leaves the
/// process, so a remote caller cannot use the error channel as an oracle.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many attempts, retry after {0}s")]
    TooManyRequests(u64),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Uniform error body: `{"error": {"message": "..."}}`.
///
/// Every failure this service emits uses this shape, including rejections
/// produced inside middleware.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    message: String,
}

impl AppError {
    /// Status code and sanitized client-facing message for this error.
    ///
    /// The full error detail is logged by `into_response` before being
    /// discarded; internal variants never leak their payload.
    fn client_message(&self) -> (StatusCode, &str) {
        match self {
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Service configuration error",
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.as_str()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.as_str()),
            AppError::TooManyRequests(_) => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many failed attempts. Please wait before retrying.",
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log full detail server-side; clients only see the sanitized body.
        match &self {
            AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
            }
            _ => {
                tracing::warn!(error = %self, "Request rejected");
            }
        }

        let (status, message) = self.client_message();
        let body = axum::Json(ErrorBody {
            error: ErrorDetail {
                message: message.to_string(),
            },
        });

        if let AppError::TooManyRequests(retry_after) = &self {
            (status, [(RETRY_AFTER, retry_after.to_string())], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_status() {
        let resp = AppError::Unauthorized("Authentication required".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_forbidden_status() {
        let resp = AppError::Forbidden("Invalid CSRF token".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_too_many_requests_sets_retry_after() {
        let resp = AppError::TooManyRequests(30).into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers().get(RETRY_AFTER).unwrap(), "30");
    }

    #[test]
    fn test_config_error_hides_detail() {
        let err = AppError::Config("SECRET_FILE unreadable: /etc/x".to_string());
        let (_, msg) = err.client_message();
        assert!(!msg.contains("/etc/x"));
    }
}
