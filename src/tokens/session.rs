//! Stateless session tokens.
//!
//! A session token is `"{timestamp}.{signature}"` where `timestamp` is
//! milliseconds since the Unix epoch at issuance and `signature` is the
//! hex-encoded HMAC-SHA256 of `"session:{timestamp}"` under the process
//! signing secret. It encodes "this browser presented valid credentials at
//! time T" and nothing else; the display identity travels in a separate,
//! non-authoritative cookie.
//!
//! # Lifecycle
//!
//! Created at login, destroyed client-side at logout by cookie clearing.
//! The server never tracks active sessions, so a copied token stays valid
//! until natural expiry even after logout.

use std::sync::Arc;
use std::time::Duration;

use crate::compare::timing_safe_eq;
use crate::secret::SigningSecret;

use super::{now_millis, sign_hex};

/// Fixed prefix signed into every session token, separating it from other
/// HMAC uses of the same secret.
const SESSION_PREFIX: &str = "session:";

/// Creates and validates stateless session tokens.
#[derive(Clone)]
pub struct SessionTokenCodec {
    secret: Arc<SigningSecret>,
    ttl: Duration,
}

impl SessionTokenCodec {
    /// Create a codec signing with `secret`, valid for `ttl` after issuance.
    pub fn new(secret: Arc<SigningSecret>, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Issue a token for the current instant.
    pub fn create(&self) -> String {
        self.create_at(now_millis())
    }

    /// Check a presented token against the secret and the current clock.
    ///
    /// Fails closed: any malformed input returns `false`, never an error.
    /// An expired token and a forged one are indistinguishable to the
    /// caller.
    pub fn is_valid(&self, token: &str) -> bool {
        self.is_valid_at(token, now_millis())
    }

    /// Session lifetime this codec enforces.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn create_at(&self, timestamp: i64) -> String {
        let signature = sign_hex(
            self.secret.as_bytes(),
            format!("{SESSION_PREFIX}{timestamp}").as_bytes(),
        );
        format!("{timestamp}.{signature}")
    }

    fn is_valid_at(&self, token: &str, now: i64) -> bool {
        let Some((timestamp, signature)) = token.split_once('.') else {
            return false;
        };
        let Ok(issued) = timestamp.parse::<i64>() else {
            return false;
        };

        // Inclusive boundary: a token is still valid at exactly now - t == ttl.
        // A timestamp from the future passes this check (negative age) and is
        // caught by the signature instead - a forged timestamp cannot carry a
        // valid signature. Ages too large to represent fail closed.
        let ttl_ms = self.ttl.as_millis() as i64;
        match now.checked_sub(issued) {
            Some(age) if age <= ttl_ms => {}
            _ => return false,
        }

        let expected = sign_hex(
            self.secret.as_bytes(),
            format!("{SESSION_PREFIX}{issued}").as_bytes(),
        );
        timing_safe_eq(expected.as_bytes(), signature.as_bytes())
    }
}
