//! Cookie parsing and construction.
//!
//! # Parsing Semantics
//!
//! The `Cookie` request header is split on `;`, each pair on its first `=`,
//! names and values trimmed, values percent-decoded. A fragment without `=`
//! is ignored. When a name repeats, the last occurrence wins (iteration
//! order = header order). Individual pairs are decoded with the `cookie`
//! crate so quoting and percent-encoding follow RFC 6265.
//!
//! # Cookie Inventory
//!
//! | Cookie      | HttpOnly | SameSite | Purpose                              |
//! |-------------|----------|----------|--------------------------------------|
//! | `session`   | yes      | Lax      | HMAC-signed session token            |
//! | `_csrf`     | no       | Lax      | CSRF double-submit value             |
//! | `user_name` | no       | Lax      | display-only identity, not trusted   |
//!
//! `_csrf` and `user_name` are deliberately readable by script: the
//! double-submit pattern requires the page to echo the cookie into a header,
//! and the display name is cosmetic. Do not "harden" them with HttpOnly.

use std::collections::HashMap;
use std::time::Duration;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use cookie::{Cookie, SameSite};

/// Session token cookie (HttpOnly).
pub const SESSION_COOKIE: &str = "session";

/// CSRF double-submit cookie (script-readable by design).
pub const CSRF_COOKIE: &str = "_csrf";

/// Display-name cookie; convenience for the UI, never trust-bearing.
pub const USER_NAME_COOKIE: &str = "user_name";

/// How long the CSRF cookie persists in the browser.
///
/// The value is a stable per-browser anti-forgery token, not rotated per
/// request or per session.
const CSRF_COOKIE_MAX_AGE_DAYS: i64 = 30;

/// Parse a raw `Cookie` header value into name/value pairs.
///
/// Later occurrences of a duplicate name overwrite earlier ones. Fragments
/// that are not `name=value` pairs are skipped. Never panics, whatever the
/// input.
pub fn parse_cookie_header(raw: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();

    for fragment in raw.split(';') {
        let Ok(parsed) = Cookie::parse_encoded(fragment.trim().to_string()) else {
            continue;
        };
        if parsed.name().is_empty() {
            continue;
        }
        pairs.insert(parsed.name().to_string(), parsed.value().to_string());
    }

    pairs
}

/// Extract a single cookie value from request headers.
///
/// Multiple `Cookie` headers are processed in order, so the last occurrence
/// of a duplicate name wins across headers as well.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let mut found = None;

    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        if let Some(value) = parse_cookie_header(raw).remove(name) {
            found = Some(value);
        }
    }

    found
}

/// Build the `Set-Cookie` value for a freshly issued session token.
pub fn session_cookie(token: &str, ttl: Duration, secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(ttl.as_secs() as i64))
        .build()
        .encoded()
        .to_string()
}

/// Build the `Set-Cookie` value for a newly minted CSRF token.
pub fn csrf_cookie(value: &str, secure: bool) -> String {
    Cookie::build((CSRF_COOKIE, value))
        .path("/")
        .http_only(false)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::days(CSRF_COOKIE_MAX_AGE_DAYS))
        .build()
        .encoded()
        .to_string()
}

/// Build the `Set-Cookie` value for the display-name cookie.
pub fn user_name_cookie(name: &str, ttl: Duration, secure: bool) -> String {
    Cookie::build((USER_NAME_COOKIE, name))
        .path("/")
        .http_only(false)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(ttl.as_secs() as i64))
        .build()
        .encoded()
        .to_string()
}

/// Build a `Set-Cookie` value that removes `name` from the browser.
pub fn removal_cookie(name: &str) -> String {
    let mut cookie = Cookie::new(name.to_string(), "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie.to_string()
}
