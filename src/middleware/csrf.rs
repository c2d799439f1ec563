//! Double-submit-cookie CSRF protection.
//!
//! # How It Works
//!
//! Every response to a client without a `_csrf` cookie sets one: an opaque
//! random value readable by page script (deliberately not HttpOnly). For
//! unsafe methods the client must echo the cookie value back in the
//! `X-CSRF-Token` header. A cross-site attacker can make the browser send
//! the cookie but cannot read it to build the matching header.
//!
//! # Per-Request Algorithm
//!
//! 1. Parse the request's `Cookie` header for an existing `_csrf` value.
//! 2. If absent, mint a fresh random token, schedule its `Set-Cookie` on the
//!    eventual response, and treat the minted value as "the value for this
//!    request".
//! 3. Safe methods (GET/HEAD/OPTIONS) and exempt paths pass through.
//! 4. Otherwise `X-CSRF-Token` must equal the cookie value or the request is
//!    rejected 403 with the uniform error body.
//!
//! Rejection mutates nothing: once the client reads the now-set cookie and
//! resubmits with the matching header, the retry succeeds.
//!
//! # First-Contact Property
//!
//! A client whose very first request is an unsafe method is always rejected:
//! the cookie is minted on that same response, but the matching header
//! cannot exist before a cookie round trip. This is intended and tested.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, Method, Request, Response};
use axum::response::IntoResponse;
use rand::Rng;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::compare::timing_safe_eq_str;
use crate::cookies::{CSRF_COOKIE, cookie_value, csrf_cookie};
use crate::error::AppError;
use crate::metrics::record_auth_rejection;

/// Header that must carry the CSRF cookie value on unsafe requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Entropy of a minted CSRF token, before hex encoding.
const CSRF_TOKEN_BYTES: usize = 24;

/// CSRF double-submit layer.
#[derive(Clone)]
pub struct CsrfLayer {
    /// Paths exempt from the header check (unsafe methods included)
    exempt_paths: Arc<Vec<String>>,
    /// Mark minted cookies `Secure` (production)
    secure_cookies: bool,
}

impl CsrfLayer {
    /// Create a CSRF layer.
    ///
    /// # Arguments
    ///
    /// * `exempt_paths` - Exact paths where unsafe methods skip the check
    /// * `secure_cookies` - Set the `Secure` attribute on minted cookies
    pub fn new(exempt_paths: Vec<String>, secure_cookies: bool) -> Self {
        Self {
            exempt_paths: Arc::new(exempt_paths),
            secure_cookies,
        }
    }
}

impl<S> Layer<S> for CsrfLayer {
    type Service = CsrfService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CsrfService {
            inner,
            exempt_paths: self.exempt_paths.clone(),
            secure_cookies: self.secure_cookies,
        }
    }
}

/// CSRF service wrapper.
#[derive(Clone)]
pub struct CsrfService<S> {
    inner: S,
    exempt_paths: Arc<Vec<String>>,
    secure_cookies: bool,
}

impl<S> Service<Request<Body>> for CsrfService<S>
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
        let exempt_paths = self.exempt_paths.clone();
        let secure_cookies = self.secure_cookies;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Steps 1-2: find or mint the per-browser token
            let (current, minted) = match cookie_value(req.headers(), CSRF_COOKIE) {
                Some(existing) => (existing, None),
                None => {
                    let fresh = mint_csrf_token();
                    debug!(path = %req.uri().path(), "Minting CSRF cookie for new client");
                    (fresh.clone(), Some(fresh))
                }
            };

            // Step 3: safe methods and exempt paths pass unchecked
            let path = req.uri().path();
            let checked = !is_safe_method(req.method()) && !exempt_paths.iter().any(|p| p == path);

            // Step 4: double-submit check
            if checked && !header_matches(&req, &current) {
                warn!(
                    path = %req.uri().path(),
                    method = %req.method(),
                    "CSRF token missing or mismatched"
                );
                record_auth_rejection("csrf");

                let response =
                    AppError::Forbidden("Invalid CSRF token".to_string()).into_response();
                return Ok(attach_minted_cookie(response, minted, secure_cookies));
            }

            let response = inner.call(req).await?;
            Ok(attach_minted_cookie(response, minted, secure_cookies))
        })
    }
}

/// Read-only methods that never require the CSRF header.
fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Check the `X-CSRF-Token` header against the cookie (or freshly minted)
/// value, in constant time.
fn header_matches<B>(req: &Request<B>, expected: &str) -> bool {
    if let Some(header) = req.headers().get(CSRF_HEADER)
        && let Ok(presented) = header.to_str()
    {
        return timing_safe_eq_str(presented, expected);
    }
    false
}

/// Generate a fresh CSRF token: 24 random bytes, hex-encoded.
fn mint_csrf_token() -> String {
    let mut raw = [0u8; CSRF_TOKEN_BYTES];
    rand::rng().fill(raw.as_mut_slice());
    hex::encode(raw)
}

/// Append the Set-Cookie for a newly minted token, if one was minted.
///
/// Attached to rejections too, so the client's retry can succeed.
fn attach_minted_cookie(
    mut response: Response<Body>,
    minted: Option<String>,
    secure: bool,
) -> Response<Body> {
    if let Some(fresh) = minted
        && let Ok(value) = HeaderValue::from_str(&csrf_cookie(&fresh, secure))
    {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}
