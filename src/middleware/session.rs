//! Session gate: authentication for the protected surface.
//!
//! Every request outside the public allow-list must carry a valid `session`
//! cookie. Failures split by audience: API callers get a structured 401,
//! browsers get a redirect to the login page.
//!
//! # Path Matching
//!
//! The allow-list uses exact string matching against `request.uri().path()`,
//! plus a static-asset extension check so stylesheets and scripts on the
//! login page load without a session. `/api/health` is allowed but
//! `/api/health/` (trailing slash) is not; this strictness is intentional.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::{IntoResponse, Redirect};
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::cookies::{SESSION_COOKIE, cookie_value};
use crate::error::AppError;
use crate::metrics::record_auth_rejection;
use crate::tokens::SessionTokenCodec;

/// File extensions served without a session (login page assets).
const STATIC_ASSET_EXTENSIONS: [&str; 10] = [
    ".css", ".js", ".map", ".png", ".jpg", ".svg", ".ico", ".woff", ".woff2", ".txt",
];

/// Session authentication layer.
#[derive(Clone)]
pub struct SessionGateLayer {
    codec: SessionTokenCodec,
    public_paths: Arc<Vec<String>>,
    login_path: Arc<String>,
}

impl SessionGateLayer {
    /// Create a session gate.
    ///
    /// # Arguments
    ///
    /// * `codec` - Validates presented session tokens
    /// * `public_paths` - Exact paths reachable without a session
    /// * `login_path` - Redirect target for unauthenticated browser requests
    pub fn new(codec: SessionTokenCodec, public_paths: Vec<String>, login_path: String) -> Self {
        Self {
            codec,
            public_paths: Arc::new(public_paths),
            login_path: Arc::new(login_path),
        }
    }
}

impl<S> Layer<S> for SessionGateLayer {
    type Service = SessionGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionGateService {
            inner,
            codec: self.codec.clone(),
            public_paths: self.public_paths.clone(),
            login_path: self.login_path.clone(),
        }
    }
}

/// Session gate service wrapper.
#[derive(Clone)]
pub struct SessionGateService<S> {
    inner: S,
    codec: SessionTokenCodec,
    public_paths: Arc<Vec<String>>,
    login_path: Arc<String>,
}

impl<S> Service<Request<Body>> for SessionGateService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let codec = self.codec.clone();
        let public_paths = self.public_paths.clone();
        let login_path = self.login_path.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path();

            if is_public_path(path, &public_paths) {
                return inner.call(req).await;
            }

            if let Some(token) = cookie_value(req.headers(), SESSION_COOKIE)
                && codec.is_valid(&token)
            {
                debug!(path, "Session accepted");
                return inner.call(req).await;
            }

            warn!(path, "Rejecting request without valid session");
            record_auth_rejection("session");

            let response = if path.starts_with("/api/") {
                AppError::Unauthorized("Authentication required".to_string()).into_response()
            } else {
                Redirect::to(&login_path).into_response()
            };
            Ok(response)
        })
    }
}

/// Check whether a path bypasses the session gate.
fn is_public_path(path: &str, public_paths: &[String]) -> bool {
    if public_paths.iter().any(|p| p == path) {
        return true;
    }
    STATIC_ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
