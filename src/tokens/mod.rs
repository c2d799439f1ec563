//! Stateless HMAC-signed tokens.
//!
//! Two token families share the process signing secret:
//!
//! - **Session tokens** ([`SessionTokenCodec`]): long-lived, carried in an
//!   HttpOnly cookie, prove a prior successful login.
//! - **Action tokens** ([`RequestTokenCodec`]): short-lived, carried in
//!   request headers, prove fresh intent to trigger one expensive upstream
//!   call.
//!
//! Both are pure functions of (wall clock, secret, input): no server-side
//! store, no revocation list, full parallelism across requests. Validation
//! fails closed - malformed input, an expired timestamp, and a forged
//! signature are all just `false`, indistinguishable to the caller.

pub mod request;
pub mod session;

pub use request::{IssuedToken, RequestTokenCodec};
pub use session::SessionTokenCodec;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Sign a message with HMAC-SHA256 and hex-encode the tag.
#[allow(clippy::expect_used)]
pub(crate) fn sign_hex(secret: &[u8], message: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
