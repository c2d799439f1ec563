//! Text rewrite endpoint - the gated expensive surface.
//!
//! `POST /api/rewrite` sits behind all three trust boundaries: CSRF, the
//! session gate, and the per-route action-token gate. Reaching this handler
//! means the caller proved same-origin script access, a prior login, and
//! fresh intent within the token window.

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::AppResult;
use crate::models::{RewriteRequest, RewriteResponse};
use crate::state::AppState;
use crate::validation::validate_rewrite_text;

/// Rewrite a block of text.
///
/// Currently a validated passthrough.
// TODO: wire the upstream model client here and stream its output.
#[instrument(skip(state, payload), fields(chars = payload.text.chars().count()))]
pub async fn rewrite_text(
    State(state): State<AppState>,
    Json(payload): Json<RewriteRequest>,
) -> AppResult<Json<RewriteResponse>> {
    validate_rewrite_text(&payload.text, state.config.max_text_length)?;

    Ok(Json(RewriteResponse {
        success: true,
        text: payload.text,
    }))
}
