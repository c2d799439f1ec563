//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (applied in order)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   CSRF Guard     │ ← 403 on unsafe methods without matching header
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │   Session Gate   │ ← 401 under /api, redirect elsewhere
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ Request ID/Trace │ ← X-Request-Id + HTTP logging
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  [Action Gate]   │ ← 403, only on /api/rewrite
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! # Route Groups
//!
//! - `/api/health`, `/api/login`, `/api/logout` - public allow-list
//! - `/api/token` - session required
//! - `/api/rewrite` - session + CSRF + action token required

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::{ActionTokenLayer, CsrfLayer, SessionGateLayer};
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
///
/// # Trust Composition
///
/// The CSRF guard runs first on every request, then the session gate, then
/// (for `/api/rewrite` only) the action-token gate. Each boundary rejects
/// independently with the uniform error body.
///
/// # Arguments
///
/// * `state` - Application state containing config and token codecs
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    let cors = build_cors_layer(&config.cors_allowed_origins);

    // Routes requiring a fresh action token on top of the session
    let gated = Router::new()
        .route("/api/rewrite", post(handlers::rewrite_text))
        .route_layer(ActionTokenLayer::new(state.actions.clone()));

    let mut router = Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/token", get(handlers::issue_token))
        .merge(gated);

    // =========================================================================
    // Apply Middleware Stack (order matters - applied bottom to top)
    // =========================================================================

    // 1. Request body size limit (prevents DoS via large payloads)
    info!(
        max_size_mb = config.max_request_body_size / (1024 * 1024),
        "Request body size limit configured"
    );
    router = router.layer(DefaultBodyLimit::max(config.max_request_body_size));

    // 2. CORS
    router = router.layer(cors);

    // 3. Request ID propagation + tracing
    router = router.layer(PropagateRequestIdLayer::x_request_id());
    router = router.layer(TraceLayer::new_for_http());
    router = router.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    // 4. Session gate
    router = router.layer(SessionGateLayer::new(
        state.sessions.clone(),
        config.public_paths.clone(),
        config.login_path.clone(),
    ));

    // 5. CSRF guard - applied last, runs first in the request pipeline
    info!(
        exempt_paths = config.csrf_exempt_paths.len(),
        secure_cookies = config.production,
        "CSRF protection enabled"
    );
    router = router.layer(CsrfLayer::new(
        config.csrf_exempt_paths.clone(),
        config.production,
    ));

    // Add state
    router.with_state(state)
}

/// Build CORS layer from configuration.
///
/// # Arguments
///
/// * `allowed_origins` - List of allowed origins, or `["*"]` for any origin
///
/// # Security Note
///
/// Using `*` (any origin) is convenient for development but should be
/// avoided in production. Specify explicit origins instead.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    // Check if we should allow any origin
    let allow_any = allowed_origins.iter().any(|o| o == "*");

    if allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Parse specific origins
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
