//! Shared application state for Axum handlers.
//!
//! The signing secret is resolved exactly once, before the router is built,
//! and injected here; the two token codecs close over it. Everything in this
//! state is either immutable after construction or internally synchronized,
//! so handlers clone it freely and validation runs with full parallelism -
//! each request's authentication decision depends only on its own presented
//! credentials and the wall clock.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

use crate::config::Config;
use crate::secret::SigningSecret;
use crate::tokens::{RequestTokenCodec, SessionTokenCodec};

/// Per-IP rate limiter tracking login failures.
pub type LoginFailureLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Shared application state.
///
/// Cloned for each request handler; internals are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Creates and validates session tokens
    pub sessions: SessionTokenCodec,
    /// Issues and verifies short-lived action tokens
    pub actions: RequestTokenCodec,
    /// Per-IP login failure limiter (None while login is unconfigured)
    pub login_limiter: Option<Arc<LoginFailureLimiter>>,
    /// Timestamp when the application started
    pub started_at: Instant,
}

impl AppState {
    /// Create application state from a resolved secret and configuration.
    pub fn new(secret: SigningSecret, config: Config) -> Self {
        let secret = Arc::new(secret);
        let sessions = SessionTokenCodec::new(secret.clone(), config.session_ttl);
        let actions = RequestTokenCodec::new(secret, config.request_token_ttl);
        let login_limiter = build_login_limiter(&config);

        Self {
            config: Arc::new(config),
            sessions,
            actions,
            login_limiter,
            started_at: Instant::now(),
        }
    }

    /// Get the application uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Build the login failure limiter when login is configured.
///
/// No limiter is created while admin credentials are absent - every login
/// attempt fails fast with 403 in that mode.
fn build_login_limiter(config: &Config) -> Option<Arc<LoginFailureLimiter>> {
    if !config.login_enabled() {
        return None;
    }

    let limit = NonZeroU32::new(config.login_failure_limit)?;
    let burst = NonZeroU32::new(config.login_failure_burst).unwrap_or(limit);
    let quota = Quota::per_minute(limit).allow_burst(burst);
    Some(Arc::new(RateLimiter::keyed(quota)))
}
