use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Submitted username
    pub username: String,
    /// Submitted password
    pub password: String,
}

/// Response to a successful login or logout.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always true; failures use the uniform error body instead
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since process start
    pub uptime_seconds: u64,
    /// Current server time
    pub timestamp: DateTime<Utc>,
}

/// Request to rewrite a block of text.
#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    /// The text to humanize
    pub text: String,
}

/// Response from the rewrite endpoint.
#[derive(Debug, Serialize)]
pub struct RewriteResponse {
    /// Whether the rewrite completed
    pub success: bool,
    /// The rewritten text
    pub text: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_deserializes() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"admin","password":"hunter2"}"#).unwrap();
        assert_eq!(req.username, "admin");
        assert_eq!(req.password, "hunter2");
    }

    #[test]
    fn test_login_request_missing_field_fails() {
        let result = serde_json::from_str::<LoginRequest>(r#"{"username":"admin"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_success_response_shape() {
        let json = serde_json::to_value(SuccessResponse::ok()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }
}
