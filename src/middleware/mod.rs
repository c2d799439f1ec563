//! HTTP middleware composing the service's three trust boundaries.
//!
//! - **CSRF** ([`CsrfLayer`]): double-submit cookie/header check, runs first
//!   on every request.
//! - **Session gate** ([`SessionGateLayer`]): valid `session` cookie or a
//!   401/redirect, runs second.
//! - **Action-token gate** ([`ActionTokenLayer`]): per-route layer on
//!   endpoints that trigger costly upstream calls.
//!
//! # Architecture
//!
//! ```text
//! Request → CSRF → Session Gate → [Action Gate] → Handler
//!             ↓          ↓               ↓
//!           403       401 / 302        403
//! ```
//!
//! The three boundaries are independent by design: CSRF proves same-origin
//! script access, the session proves a prior login, and the action token
//! proves fresh intent to trigger a costly upstream call. Authenticated state-changing
//! requests need all that apply to their route.

pub mod action;
pub mod csrf;
pub mod ip;
pub mod session;

pub use action::{ActionTokenLayer, REQUEST_TIMESTAMP_HEADER, REQUEST_TOKEN_HEADER};
pub use csrf::{CSRF_HEADER, CsrfLayer};
pub use ip::{UNKNOWN_IP, client_ip};
pub use session::SessionGateLayer;
