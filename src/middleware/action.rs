//! Action-token gate for expensive endpoints.
//!
//! Applied per-route (not globally) on endpoints that trigger costly
//! upstream calls. The client first fetches a token from `GET /api/token`,
//! then presents it with its issuance timestamp on the gated request:
//!
//! ```text
//! X-Request-Token:     <hex HMAC over the timestamp>
//! X-Request-Timestamp: <milliseconds since epoch>
//! ```
//!
//! Missing headers, a non-numeric timestamp, a stale or future-dated
//! timestamp, and a bad signature all produce the same 403.

use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use tower::{Layer, Service};
use tracing::warn;

use crate::error::AppError;
use crate::metrics::record_auth_rejection;
use crate::tokens::RequestTokenCodec;

/// Header carrying the action token.
pub const REQUEST_TOKEN_HEADER: &str = "x-request-token";

/// Header carrying the token's issuance timestamp.
pub const REQUEST_TIMESTAMP_HEADER: &str = "x-request-timestamp";

/// Action-token layer.
#[derive(Clone)]
pub struct ActionTokenLayer {
    codec: RequestTokenCodec,
}

impl ActionTokenLayer {
    /// Create an action-token gate verifying with `codec`.
    pub fn new(codec: RequestTokenCodec) -> Self {
        Self { codec }
    }
}

impl<S> Layer<S> for ActionTokenLayer {
    type Service = ActionTokenService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ActionTokenService {
            inner,
            codec: self.codec.clone(),
        }
    }
}

/// Action-token service wrapper.
#[derive(Clone)]
pub struct ActionTokenService<S> {
    inner: S,
    codec: RequestTokenCodec,
}

impl<S> Service<Request<Body>> for ActionTokenService<S>
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
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if verify_headers(&req, &codec) {
                return inner.call(req).await;
            }

            warn!(path = %req.uri().path(), "Rejecting request without valid action token");
            record_auth_rejection("action");
            Ok(AppError::Forbidden("Invalid or expired request token".to_string()).into_response())
        })
    }
}

/// Extract and verify the token/timestamp header pair. Fails closed.
fn verify_headers<B>(req: &Request<B>, codec: &RequestTokenCodec) -> bool {
    let Some(token) = req
        .headers()
        .get(REQUEST_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let Some(timestamp) = req
        .headers()
        .get(REQUEST_TIMESTAMP_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
    else {
        return false;
    };

    codec.verify(token, timestamp)
}
