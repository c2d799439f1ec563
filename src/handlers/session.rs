//! Login and logout.
//!
//! # Endpoints
//!
//! - `POST /api/login` - Exchange admin credentials for a session cookie
//! - `POST /api/logout` - Clear the session and display-name cookies
//!
//! Both are in the public allow-list; the CSRF check still applies, so a
//! fresh browser must make one safe request (loading the login page) before
//! its first POST can succeed.
//!
//! # Brute Force Protection
//!
//! Login failures are counted per client IP with a keyed rate limiter.
//! Once an IP exceeds the window, further attempts are answered 429 before
//! any credential comparison happens.
//!
//! # Statelessness
//!
//! Logout clears cookies client-side only. The server keeps no session
//! table, so a copied token remains valid until natural expiry; the short
//! session lifetime is the only bound.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use governor::clock::{Clock, DefaultClock};
use tracing::{info, instrument, warn};

use crate::compare::timing_safe_eq_str;
use crate::cookies::{
    SESSION_COOKIE, USER_NAME_COOKIE, removal_cookie, session_cookie, user_name_cookie,
};
use crate::error::{AppError, AppResult};
use crate::metrics::{record_login, record_session_issued};
use crate::middleware::client_ip;
use crate::models::{LoginRequest, SuccessResponse};
use crate::state::AppState;
use crate::validation::validate_login_fields;

/// Login endpoint.
///
/// # Responses
///
/// - 200 `{"success": true}` with `session` + `user_name` cookies
/// - 400 on malformed credentials
/// - 401 on wrong credentials
/// - 403 while admin credentials are unconfigured
/// - 429 once an IP exceeds the failure window
#[instrument(skip(state, headers, payload))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    validate_login_fields(&payload.username, &payload.password)?;

    let (Some(admin_user), Some(admin_password)) =
        (&state.config.admin_user, &state.config.admin_password)
    else {
        warn!("Login attempted while admin credentials are unconfigured");
        record_login("unconfigured");
        return Err(AppError::Forbidden("Login is not configured".to_string()));
    };

    // Check whether this IP is blocked from excessive failures
    let ip = client_ip(&headers).into_owned();
    if let Some(limiter) = &state.login_limiter
        && let Err(not_until) = limiter.check_key(&ip)
    {
        let wait_time = not_until.wait_time_from(DefaultClock::default().now());
        let retry_after = wait_time.as_secs().max(1);

        warn!(
            client_ip = %ip,
            retry_after_secs = retry_after,
            "IP blocked due to excessive login failures"
        );
        record_login("blocked");
        return Err(AppError::TooManyRequests(retry_after));
    }

    // Evaluate both comparisons so a wrong username costs the same as a
    // wrong password
    let user_ok = timing_safe_eq_str(&payload.username, admin_user);
    let pass_ok = timing_safe_eq_str(&payload.password, admin_password);

    if !(user_ok && pass_ok) {
        // Consume a failure token for this IP
        if let Some(limiter) = &state.login_limiter {
            let _ = limiter.check_key(&ip);
        }
        warn!(client_ip = %ip, "Login failed");
        record_login("failure");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = state.sessions.create();
    let ttl = state.sessions.ttl();
    let secure = state.config.production;

    info!(user = %payload.username, "Login succeeded");
    record_login("success");
    record_session_issued();

    Ok((
        AppendHeaders([
            (SET_COOKIE, session_cookie(&token, ttl, secure)),
            (SET_COOKIE, user_name_cookie(&payload.username, ttl, secure)),
        ]),
        Json(SuccessResponse::ok()),
    ))
}

/// Logout endpoint.
///
/// Clears the `session` and `user_name` cookies. Idempotent: safe to call
/// without a session, which is why it sits in the public allow-list.
#[instrument]
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([
            (SET_COOKIE, removal_cookie(SESSION_COOKIE)),
            (SET_COOKIE, removal_cookie(USER_NAME_COOKIE)),
        ]),
        Json(SuccessResponse::ok()),
    )
}
