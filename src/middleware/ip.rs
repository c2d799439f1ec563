//! Client IP extraction for the login failure limiter.
//!
//! # Security Warning: IP Spoofing Risk
//!
//! These headers are client-supplied. Deploy behind a trusted reverse proxy
//! that overwrites (not appends to) `X-Forwarded-For` / `X-Real-IP`, and
//! block direct internet access to this service; otherwise an attacker can
//! rotate spoofed addresses to dodge the brute-force limiter or frame
//! innocent ones into a lockout.
//!
//! Requests without identifiable IPs all share the `"unknown"` key, so they
//! are collectively rate-limited rather than individually unlimited.

use std::borrow::Cow;

use axum::http::HeaderMap;

/// Fallback key when no client IP can be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// Extract the client IP from request headers.
///
/// Checks `X-Forwarded-For` (first entry) then `X-Real-IP`, falling back to
/// [`UNKNOWN_IP`].
pub fn client_ip(headers: &HeaderMap) -> Cow<'static, str> {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return Cow::Owned(first.to_string());
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
    {
        let value = value.trim();
        if !value.is_empty() {
            return Cow::Owned(value.to_string());
        }
    }

    Cow::Borrowed(UNKNOWN_IP)
}
