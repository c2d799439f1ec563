use crate::error::{AppError, AppResult};

// =============================================================================
// Validation Constants
// =============================================================================

/// Maximum length for a submitted username or password.
///
/// Credentials beyond this are certainly wrong; rejecting early keeps the
/// timing-safe comparison input bounded.
pub const MAX_CREDENTIAL_LENGTH: usize = 256;

/// Validate submitted login fields before comparing them.
///
/// Rules:
/// - Neither field may be empty
/// - Neither field may exceed 256 characters
/// - Neither field may contain control characters
pub fn validate_login_fields(username: &str, password: &str) -> AppResult<()> {
    for (label, value) in [("Username", username), ("Password", password)] {
        if value.is_empty() {
            return Err(AppError::BadRequest(format!("{label} cannot be empty")));
        }

        if value.len() > MAX_CREDENTIAL_LENGTH {
            return Err(AppError::BadRequest(format!(
                "{label} cannot exceed {MAX_CREDENTIAL_LENGTH} characters"
            )));
        }

        if value.chars().any(char::is_control) {
            return Err(AppError::BadRequest(format!(
                "{label} contains invalid characters"
            )));
        }
    }

    Ok(())
}

/// Validate text submitted to the rewrite endpoint.
///
/// Rules:
/// - Must contain at least one non-whitespace character
/// - Must not exceed `max_length` characters
pub fn validate_rewrite_text(text: &str, max_length: usize) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("Text cannot be empty".to_string()));
    }

    let chars = text.chars().count();
    if chars > max_length {
        return Err(AppError::BadRequest(format!(
            "Text of {chars} characters exceeds the maximum of {max_length}"
        )));
    }

    Ok(())
}
