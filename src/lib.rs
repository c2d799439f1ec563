//! # prosepolish
//!
//! Web front end for an AI prose-humanizing proxy. The interesting part is
//! the fully stateless authentication and integrity core:
//!
//! - **Sessions**: HMAC-signed, expiring tokens in an HttpOnly cookie - no
//!   server-side session store
//! - **Action tokens**: short-lived signed tokens gating the expensive
//!   upstream call
//! - **CSRF**: double-submit cookie/header pair on every unsafe request
//! - **Hygiene**: timing-safe comparisons everywhere, secret provisioning
//!   with a persisted-file fallback, per-IP login brute-force limiting
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (CSRF → Session Gate → Request ID → Trace)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (health, login/logout, token, rewrite)            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Token codecs (session, action) over one signing secret     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prosepolish::{AppState, Config, SigningSecret, build_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let secret = SigningSecret::resolve(
//!         config.signing_secret.as_deref(),
//!         &config.secret_file,
//!     );
//!
//!     let state = AppState::new(secret, config);
//!     let app = build_router(state);
//!
//!     // Start the server...
//!     Ok(())
//! }
//! ```
//!
//! ## Security Configuration
//!
//! Enable login:
//! ```bash
//! ADMIN_USER=admin ADMIN_PASSWORD=change-me cargo run
//! ```
//!
//! Supply a shared secret (required when running multiple instances):
//! ```bash
//! SIGNING_SECRET=$(openssl rand -hex 32) cargo run
//! ```

pub mod compare;
pub mod config;
pub mod cookies;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod secret;
pub mod state;
pub mod tokens;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::build_router;
pub use secret::SigningSecret;
pub use state::AppState;
pub use tokens::{RequestTokenCodec, SessionTokenCodec};
