//! Short-lived action tokens for expensive upstream calls.
//!
//! An action token authorizes one class of costly operation (the upstream
//! model call) for a few minutes after a logged-in client fetches it from
//! `GET /api/token`. Unlike the session token it travels in headers
//! (`X-Request-Token` / `X-Request-Timestamp`), the timestamp rides
//! alongside rather than inside the token, and future-dated timestamps are
//! rejected outright.
//!
//! The token is not a nonce: the same pair can be replayed any number of
//! times until it expires, from any source address. The short lifetime
//! bounds the damage of leakage through logs or referrers.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::compare::timing_safe_eq;
use crate::secret::SigningSecret;

use super::{now_millis, sign_hex};

/// A freshly issued action token, shaped for the `GET /api/token` response.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// Hex-encoded HMAC over the issuance timestamp
    pub token: String,
    /// Issuance time, milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Informational lifetime in milliseconds; the server enforces its own
    /// clock, this value only lets the client schedule a refresh
    #[serde(rename = "expiresIn")]
    pub expires_in: u64,
}

/// Issues and verifies short-lived action tokens.
#[derive(Clone)]
pub struct RequestTokenCodec {
    secret: Arc<SigningSecret>,
    ttl: Duration,
}

impl RequestTokenCodec {
    /// Create a codec signing with `secret`, valid for `ttl` after issuance.
    pub fn new(secret: Arc<SigningSecret>, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Issue a token for the current instant.
    pub fn issue(&self) -> IssuedToken {
        let timestamp = now_millis();
        let token = sign_hex(
            self.secret.as_bytes(),
            timestamp.to_string().as_bytes(),
        );
        IssuedToken {
            token,
            timestamp,
            expires_in: self.ttl.as_millis() as u64,
        }
    }

    /// Verify a presented token/timestamp pair against the current clock.
    ///
    /// Fails closed on every malformed input. Rejects negative ages: a
    /// timestamp from the future is invalid even with a correct signature.
    pub fn verify(&self, token: &str, timestamp: i64) -> bool {
        self.verify_at(token, timestamp, now_millis())
    }

    fn verify_at(&self, token: &str, timestamp: i64, now: i64) -> bool {
        if token.is_empty() {
            return false;
        }

        // Ages too large to represent fail closed
        let Some(age) = now.checked_sub(timestamp) else {
            return false;
        };
        let ttl_ms = self.ttl.as_millis() as i64;
        // Inclusive boundary, matching the session codec
        if age < 0 || age > ttl_ms {
            return false;
        }

        let expected = sign_hex(
            self.secret.as_bytes(),
            timestamp.to_string().as_bytes(),
        );
        timing_safe_eq(expected.as_bytes(), token.as_bytes())
    }
}
