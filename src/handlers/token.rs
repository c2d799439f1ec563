//! Action-token issuance.
//!
//! `GET /api/token` hands a logged-in client a short-lived token for the
//! rewrite endpoint. Issuance is stateless and unthrottled: tokens are pure
//! HMAC outputs, and every token issued inside one lifetime window is the
//! same spend of server trust.

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::metrics::record_request_token_issued;
use crate::state::AppState;
use crate::tokens::IssuedToken;

/// Issue a fresh action token.
///
/// The session gate has already run for this route, so reaching the handler
/// implies a valid session.
///
/// # Response Body
///
/// ```json
/// {
///   "token": "9f8a...",
///   "timestamp": 1700000000000,
///   "expiresIn": 300000
/// }
/// ```
#[instrument(skip(state))]
pub async fn issue_token(State(state): State<AppState>) -> Json<IssuedToken> {
    record_request_token_issued();
    Json(state.actions.issue())
}
